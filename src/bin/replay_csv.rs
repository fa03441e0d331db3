//! Reproduce una grabación sin reloj: mismos ticks, misma cadencia y mismos
//! modelos que el colector, pero todo síncrono y determinista.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};

use odometro::estimator::Estimator;
use odometro::frame_buffer::FrameBuffer;
use odometro::gesture_classifier::{GestureClassifier, ModelTable};
use odometro::integrator::PositionIntegrator;
use odometro::model::{ModelStore, OnnxModelStore};
use odometro::recording::{load_events_from_csv, missing_kinds, RecordingCursor};
use odometro::scheduler::{Cadence, TickAction};
use odometro::sensor_bridge::SensorBridge;
use odometro::CollectorConfig;

#[derive(Parser, Debug)]
#[command(name = "replay_csv", about = "Reproducción offline de una grabación de sensores")]
struct ReplayOptions {
    /// Grabación CSV (t_ms,sensor,v0,v1,v2,v3)
    recording: PathBuf,

    /// Directorio con los modelos .onnx
    #[arg(short, long, default_value = "models")]
    models: PathBuf,

    /// Configuración JSON (opcional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Imprime el tensor plano de la última ventana completa
    #[arg(long)]
    dump_flat: bool,

    /// Imprime la posición después de cada estimación
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = ReplayOptions::parse();

    let config = match &opts.config {
        Some(path) => CollectorConfig::load(path)?,
        None => CollectorConfig::default(),
    };
    let events = load_events_from_csv(&opts.recording)
        .with_context(|| format!("No se pudo cargar {:?}", opts.recording))?;
    for kind in missing_kinds(&events) {
        warn!("⚠️  La grabación no tiene eventos de {:?}", kind);
    }
    info!("🎞️  Reproduciendo {:?} ({} eventos)", opts.recording, events.len());

    let store = OnnxModelStore::new(&opts.models);
    let table = ModelTable::new(config.models.clone());
    let period = config.tick_period_ms;
    let t0 = events.first().map_or(0, |e| e.t_ms);

    let bridge = SensorBridge::new();
    let mut cursor = RecordingCursor::new(&events);
    let mut frame = FrameBuffer::new(config.window_size);
    let mut t = t0;

    for index in 0..config.startup_ticks {
        cursor.advance_to(t, &bridge);
        frame.write(index, &bridge.current_snapshot());
        t += period;
    }

    let classifier = GestureClassifier::new(
        store.load(&config.gesture_model)?,
        config.gesture_window,
    );
    let gesture = classifier.classify_frame(&frame)?;
    let model_id = table
        .model_for(gesture)
        .ok_or_else(|| anyhow!("No hay modelo para el gesto {:?}", gesture))?;
    let estimator = Estimator::new(store.load(model_id)?, model_id);
    info!("🧭 Gesto inicial {:?}, modelo: {}", gesture, model_id);

    let mut integrator = PositionIntegrator::new(config.displacement_scale());
    let mut cadence = Cadence::new(config.window_size, config.step, config.startup_ticks);
    let mut last_full: Option<FrameBuffer> = None;
    let mut skipped = 0usize;

    while !cursor.is_done() {
        let (action, index) = cadence.advance();
        let offset = match action {
            TickAction::FullWindow => {
                match classifier.classify_frame(&frame) {
                    Ok(g) => info!("🖐️  t={} ms contexto: {:?}", t - t0, g),
                    Err(e) => warn!("⚠️  Clasificación fallida: {}", e),
                }
                last_full = Some(frame.snapshot());
                Some(0)
            }
            TickAction::Step { offset } => Some(offset),
            TickAction::Sample => None,
        };

        if let Some(offset) = offset {
            match estimator.estimate(&frame, offset) {
                Ok(d) => {
                    let p = integrator.apply(d);
                    if opts.trace {
                        println!("{:>8} ms  x={:>9.4} y={:>9.4}", t - t0, p.x, p.y);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    warn!("⚠️  Estimación descartada (offset {}): {}", offset, e);
                }
            }
        }

        cursor.advance_to(t, &bridge);
        frame.write(index, &bridge.current_snapshot());
        t += period;
    }

    let p = integrator.current();
    println!(
        "\n🏁 Posición final: x={:.4} y={:.4} ({} estimaciones, {} descartadas, {} ms)",
        p.x,
        p.y,
        integrator.applied(),
        skipped,
        cursor.duration_ms()
    );

    if opts.dump_flat {
        match last_full {
            Some(frame) => {
                let flat = frame.flatten(0);
                println!(
                    "\n🧱 Tensor plano {:?} ({} valores):",
                    flat.shape(),
                    flat.as_slice().len()
                );
                for (idx, value) in flat.as_slice().iter().enumerate() {
                    println!("  {:04}: {:>12.6}", idx, value);
                }
            }
            None => println!("\nℹ️  La grabación no llegó a completar una ventana"),
        }
    }

    Ok(())
}
