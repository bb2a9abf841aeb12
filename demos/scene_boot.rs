//! # Demo: scene_boot
//!
//! Boots a small scene: two live participants (one with a child), two
//! templates (one already present in the scene), and a participant that fails
//! its bind phase. Events are rendered through `tracing` by [`LogWriter`].
//!
//! ## Flow
//! ```text
//! Orchestrator::run()
//!     ├─► Discovery
//!     │     ├─► live: Player ─► child Inventory
//!     │     ├─► live: Hud (Clone)
//!     │     ├─► template "Hud"   ─► TemplateSkipped
//!     │     └─► template "Audio" ─► TemplateInstantiated
//!     ├─► Awake / UiInitialize / Bind / Start   (Inventory fails Bind)
//!     └─► LifecycleCompleted ─► InitSignal completed
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example scene_boot --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use phasevisor::{
    Behaviour, Category, ComponentFn, Config, InstantiateError, Level, LogWriter, Node,
    Orchestrator, PhaseContext, PhaseError, Scene, Subscribe, TargetRef, Template,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Player {
    inventory: TargetRef,
}

impl Node for Player {
    fn name(&self) -> &str {
        "Player"
    }

    fn children(&self) -> Vec<TargetRef> {
        vec![Arc::clone(&self.inventory)]
    }
}

#[async_trait]
impl Behaviour for Player {
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.log(Level::Info, Category::Gameplay, "spawned at checkpoint 3");
        Ok(())
    }
}

struct Inventory;

impl Node for Inventory {
    fn name(&self) -> &str {
        "Inventory"
    }
}

#[async_trait]
impl Behaviour for Inventory {
    async fn on_bind(&self, _ctx: &PhaseContext) -> Result<(), PhaseError> {
        Err(PhaseError::fail("save slot 2 is corrupted"))
    }
}

struct Hud {
    name: String,
}

impl Node for Hud {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Behaviour for Hud {
    async fn on_ui_initialize(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.log(Level::Info, Category::Ui, "widgets laid out");
        Ok(())
    }
}

struct Audio {
    name: String,
}

impl Node for Audio {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Behaviour for Audio {
    async fn on_start(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.log(Level::Verbose, Category::Audio, "ambience playing");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let scene = Scene::new("Field")
        .with_target(Arc::new(Player {
            inventory: Arc::new(Inventory),
        }))
        .with_target(Arc::new(Hud {
            name: "Hud (Clone)".into(),
        }));

    let templates = vec![
        Template::new("Hud").with_component(ComponentFn::<Hud, _>::arc(
            |template: Arc<str>| async move {
                Ok::<_, InstantiateError>(Arc::new(Hud {
                    name: format!("{template} (Clone)"),
                }))
            },
        )),
        Template::new("Audio").with_component(ComponentFn::<Audio, _>::arc(
            |template: Arc<str>| async move {
                Ok::<_, InstantiateError>(Arc::new(Audio {
                    name: format!("{template} (Clone)"),
                }))
            },
        )),
    ];

    let cfg = Config {
        phase_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let orch = Orchestrator::builder(cfg)
        .with_environment(Arc::new(scene))
        .with_templates(templates)
        .with_subscribers(subs)
        .build();

    let outcome = orch.run().await?;
    orch.signal().wait(&CancellationToken::new()).await?;

    if let Some(report) = outcome.report() {
        println!(
            "initialized {} participants, {} failures",
            report.participants(),
            report.failures().count()
        );
        for f in report.failures() {
            println!("  {} ({}) in {}: {}", f.object, f.participant, f.phase, f.error);
        }
    }

    // let the subscriber worker drain before exiting
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}
