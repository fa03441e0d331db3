use crate::types::{Displacement, Position};

/// Acumula desplazamientos en una posición 2D.
///
/// Cada contribución es una suma independiente, así que el orden en que
/// llegan las inferencias no cambia el resultado final.
#[derive(Debug, Clone)]
pub struct PositionIntegrator {
    position: Position,
    scale: f32,
    applied: u64,
}

impl PositionIntegrator {
    /// `scale`: factor por paso (1 / STEP)
    pub fn new(scale: f32) -> Self {
        Self {
            position: Position::default(),
            scale,
            applied: 0,
        }
    }

    pub fn apply(&mut self, d: Displacement) -> Position {
        self.position.x += d.dx * self.scale;
        self.position.y += d.dy * self.scale;
        self.applied += 1;
        self.position
    }

    pub fn current(&self) -> Position {
        self.position
    }

    /// Número de desplazamientos aplicados
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn starts_at_origin() {
        let integrator = PositionIntegrator::new(0.1);
        assert_eq!(integrator.current(), Position::default());
        assert_eq!(integrator.applied(), 0);
    }

    #[test]
    fn applies_scale() {
        let mut integrator = PositionIntegrator::new(0.1);
        let p = integrator.apply(Displacement::new(2.0, -4.0));
        assert!((p.x - 0.2).abs() < 1e-6);
        assert!((p.y + 0.4).abs() < 1e-6);
        assert_eq!(integrator.current(), p);
        assert_eq!(integrator.applied(), 1);
    }

    #[test]
    fn order_does_not_matter() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut displacements: Vec<Displacement> = (0..50)
            .map(|i| {
                let f = i as f32;
                Displacement::new((f * 0.37).sin(), (f * 0.11).cos() - 0.5)
            })
            .collect();

        let mut reference = PositionIntegrator::new(0.1);
        for d in &displacements {
            reference.apply(*d);
        }
        let expected = reference.current();

        for _ in 0..20 {
            displacements.shuffle(&mut rng);
            let mut integrator = PositionIntegrator::new(0.1);
            for d in &displacements {
                integrator.apply(*d);
            }
            let p = integrator.current();
            assert!((p.x - expected.x).abs() < 1e-4, "{} vs {}", p.x, expected.x);
            assert!((p.y - expected.y).abs() < 1e-4, "{} vs {}", p.y, expected.y);
            assert_eq!(integrator.applied(), 50);
        }
    }
}
