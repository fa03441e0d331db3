/*
Odometría inercial en tiempo real - Rust + ONNX

Reproduce una grabación de sensores (CSV t_ms,sensor,v0,v1,v2,v3) como si
fuera el servicio de sensores del sistema y va imprimiendo la posición
estimada.

    RUST_LOG=info ./target/release/odometro --recording paseo.csv --models models/
*/

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{after, never, select};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use odometro::model::OnnxModelStore;
use odometro::recording::ReplaySource;
use odometro::{ChannelObserver, Collector, CollectorConfig, CollectorEvent};

#[derive(Parser, Debug)]
#[command(name = "odometro", about = "Odometría inercial con modelos ONNX")]
struct Args {
    /// Grabación de sensores a reproducir
    #[arg(short, long)]
    recording: PathBuf,

    /// Directorio con los modelos .onnx
    #[arg(short, long, default_value = "models")]
    models: PathBuf,

    /// Configuración JSON (opcional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Segundos máximos de ejecución (por defecto, hasta acabar la grabación)
    #[arg(short, long)]
    seconds: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("🎯 Odometría inercial - Rust + ONNX");

    let config = match &args.config {
        Some(path) => CollectorConfig::load(path)
            .with_context(|| format!("No se pudo leer la configuración {:?}", path))?,
        None => CollectorConfig::default(),
    };

    let source = Arc::new(
        ReplaySource::from_csv(&args.recording)
            .with_context(|| format!("No se pudo cargar la grabación {:?}", args.recording))?,
    );
    let store = Arc::new(OnnxModelStore::new(&args.models));
    let (observer, events) = ChannelObserver::new();

    let collector =
        Collector::new(config, store, source.clone())?.with_observer(Arc::new(observer));
    let cfg = collector.config();
    info!(
        "📐 Ventana W={} paso={} tick={} ms",
        cfg.window_size, cfg.step, cfg.tick_period_ms
    );

    info!("🔧 Llenando ventana inicial y clasificando contexto...");
    collector.start().context("El arranque del colector falló")?;
    info!("✅ Colector en marcha (gesto: {:?})", collector.gesture());

    let deadline = match args.seconds {
        Some(secs) => after(Duration::from_secs(secs)),
        None => never(),
    };
    while !source.is_finished() {
        select! {
            recv(events) -> msg => match msg {
                Ok(CollectorEvent::Position(p)) => {
                    info!("📍 x={:>8.3} y={:>8.3}", p.x, p.y);
                }
                Ok(CollectorEvent::Gesture(g)) => {
                    info!("🖐️  Contexto: {:?}", g);
                }
                Err(_) => {
                    warn!("Canal de eventos cerrado");
                    break;
                }
            },
            recv(deadline) -> _ => break,
            default(Duration::from_millis(200)) => {}
        }
    }

    collector.stop();
    let p = collector.position();
    info!(
        "🏁 Posición final: x={:.3} y={:.3} ({} estimaciones)",
        p.x,
        p.y,
        collector.estimates_applied()
    );
    Ok(())
}
