use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use phasevisor::{
    Behaviour, ComponentFn, Config, CycleState, Event, EventKind, InitSignal, InstantiateError,
    Node, Orchestrator, Outcome, Phase, PhaseContext, PhaseError, RuntimeError, Scene, Subscribe,
    TargetRef, Template, WaitError,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Enter,
    Exit,
}

#[derive(Clone, Debug)]
struct Stamp {
    who: String,
    phase: Phase,
    edge: Edge,
}

type Log = Arc<Mutex<Vec<Stamp>>>;

struct Recorder {
    name: String,
    log: Log,
    delay: Duration,
    fail_in: Option<Phase>,
    panic_in: Option<Phase>,
    children: Vec<TargetRef>,
}

impl Recorder {
    fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            delay: Duration::from_millis(10),
            fail_in: None,
            panic_in: None,
            children: Vec::new(),
        }
    }

    fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing_in(mut self, phase: Phase) -> Self {
        self.fail_in = Some(phase);
        self
    }

    fn panicking_in(mut self, phase: Phase) -> Self {
        self.panic_in = Some(phase);
        self
    }

    fn with_child(mut self, child: TargetRef) -> Self {
        self.children.push(child);
        self
    }

    async fn step(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.stamp(ctx.phase(), Edge::Enter);
        tokio::time::sleep(self.delay).await;
        self.stamp(ctx.phase(), Edge::Exit);

        if self.panic_in == Some(ctx.phase()) {
            panic!("{} exploded", self.name);
        }
        if self.fail_in == Some(ctx.phase()) {
            return Err(PhaseError::fail(format!("{} refused", self.name)));
        }
        Ok(())
    }

    fn stamp(&self, phase: Phase, edge: Edge) {
        self.log.lock().push(Stamp {
            who: self.name.clone(),
            phase,
            edge,
        });
    }
}

impl Node for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> Vec<TargetRef> {
        self.children.clone()
    }
}

#[async_trait]
impl Behaviour for Recorder {
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.step(ctx).await
    }

    async fn on_ui_initialize(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.step(ctx).await
    }

    async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.step(ctx).await
    }

    async fn on_start(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.step(ctx).await
    }
}

#[derive(Default)]
struct Probe {
    seen: Mutex<Vec<Event>>,
}

impl Probe {
    fn count(&self, kind: EventKind) -> usize {
        self.seen.lock().iter().filter(|e| e.kind == kind).count()
    }

    async fn wait_for(&self, kind: EventKind) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.count(kind) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("event never arrived");
    }
}

#[async_trait]
impl Subscribe for Probe {
    async fn on_event(&self, event: &Event) {
        self.seen.lock().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "probe"
    }
}

fn calls_of(log: &Log, who: &str) -> Vec<Phase> {
    log.lock()
        .iter()
        .filter(|s| s.who == who && s.edge == Edge::Enter)
        .map(|s| s.phase)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn phases_run_in_order_behind_barriers() {
    let log: Log = Log::default();
    let scene = Scene::new("Field")
        .with_target(Arc::new(Recorder::new("slow", &log).delay(Duration::from_millis(40))))
        .with_target(Arc::new(Recorder::new("mid", &log).delay(Duration::from_millis(20))))
        .with_target(Arc::new(Recorder::new("fast", &log).delay(Duration::from_millis(1))));

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .build();
    let outcome = orch.run().await.expect("run");

    let report = outcome.report().expect("completed");
    assert_eq!(report.participants(), 3);
    assert!(report.is_clean());
    assert_eq!(report.phases.len(), 4);

    let stamps = log.lock().clone();
    assert_eq!(stamps.len(), 3 * 4 * 2);

    // every participant enters a phase before any of them leaves it
    assert!(stamps[..3]
        .iter()
        .all(|s| s.phase == Phase::Awake && s.edge == Edge::Enter));

    for pair in Phase::ALL.windows(2) {
        let last_exit = stamps
            .iter()
            .rposition(|s| s.phase == pair[0] && s.edge == Edge::Exit)
            .expect("exit stamp");
        let first_enter = stamps
            .iter()
            .position(|s| s.phase == pair[1] && s.edge == Edge::Enter)
            .expect("enter stamp");
        assert!(last_exit < first_enter, "{} overlapped {}", pair[1], pair[0]);
    }
}

#[tokio::test(start_paused = true)]
async fn failures_are_isolated_and_later_phases_still_run() {
    let log: Log = Log::default();
    let probe = Arc::new(Probe::default());
    let scene = Scene::new("Field")
        .with_target(Arc::new(Recorder::new("refuser", &log).failing_in(Phase::Awake)))
        .with_target(Arc::new(Recorder::new("bomb", &log).panicking_in(Phase::Bind)))
        .with_target(Arc::new(Recorder::new("steady", &log)));

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .with_subscribers(vec![probe.clone() as Arc<dyn Subscribe>])
        .build();
    let outcome = orch.run().await.expect("participant failures never fail the run");

    for who in ["refuser", "bomb", "steady"] {
        assert_eq!(calls_of(&log, who), Phase::ALL, "{who}");
    }

    let report = outcome.report().expect("completed");
    let failures: Vec<_> = report
        .failures()
        .map(|f| (f.object.to_string(), f.phase, f.error.as_label()))
        .collect();
    assert_eq!(
        failures,
        [
            ("refuser".to_string(), Phase::Awake, "phase_failed"),
            ("bomb".to_string(), Phase::Bind, "phase_panicked"),
        ]
    );
    assert!(report.failures().all(|f| f.participant == "Recorder"));

    assert!(matches!(orch.signal().state(), Some(CycleState::Completed)));
    orch.signal()
        .wait(&CancellationToken::new())
        .await
        .expect("signal completed");

    probe.wait_for(EventKind::LifecycleCompleted).await;
    assert_eq!(probe.count(EventKind::ParticipantFailed), 2);
}

#[tokio::test]
async fn production_guard_redirects_without_running_phases() {
    let log: Log = Log::default();
    let scene = Arc::new(Scene::new("Debug").with_target(Arc::new(Recorder::new("lamp", &log))));
    let cfg = Config {
        debug_mode: false,
        ..Config::default()
    };

    let orch = Orchestrator::builder(cfg)
        .with_environment(scene.clone())
        .build();
    let outcome = orch.run().await.expect("redirect");

    assert!(matches!(outcome, Outcome::Redirected { ref scene } if scene == "Title"));
    assert_eq!(scene.loads(), ["Title"]);
    assert!(log.lock().is_empty());
    assert!(orch.signal().state().is_none());
}

#[tokio::test]
async fn production_scene_runs_normally() {
    let log: Log = Log::default();
    let scene = Arc::new(
        Scene::new("Title").with_target(Arc::new(
            Recorder::new("lamp", &log).delay(Duration::ZERO),
        )),
    );
    let cfg = Config {
        debug_mode: false,
        ..Config::default()
    };

    let orch = Orchestrator::builder(cfg)
        .with_environment(scene.clone())
        .build();
    let outcome = orch.run().await.expect("run");

    assert!(!outcome.is_redirected());
    assert!(scene.loads().is_empty());
    assert_eq!(calls_of(&log, "lamp"), Phase::ALL);
}

#[tokio::test]
async fn nested_and_shared_children_are_registered_once() {
    let log: Log = Log::default();
    let leaf: TargetRef = Arc::new(Recorder::new("leaf", &log).delay(Duration::ZERO));
    let branch: TargetRef = Arc::new(
        Recorder::new("branch", &log)
            .delay(Duration::ZERO)
            .with_child(leaf.clone()),
    );
    let root = Recorder::new("root", &log)
        .delay(Duration::ZERO)
        .with_child(branch.clone())
        .with_child(leaf.clone());

    let scene = Scene::new("Field").with_target(Arc::new(root));
    scene.add_target(leaf.clone());

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .build();
    let outcome = orch.run().await.expect("run");

    let names: Vec<_> = outcome
        .report()
        .expect("completed")
        .roster
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, ["root", "branch", "leaf"]);
    for who in ["root", "branch", "leaf"] {
        assert_eq!(calls_of(&log, who), Phase::ALL, "{who}");
    }
}

#[tokio::test]
async fn templates_fill_in_missing_participants() {
    let log: Log = Log::default();
    let existing = Recorder::new("Hud (Clone)", &log).delay(Duration::ZERO);
    let scene = Scene::new("Field").with_target(Arc::new(existing));

    let factory_log = Arc::clone(&log);
    let make = move |template: Arc<str>| {
        let log = Arc::clone(&factory_log);
        async move {
            Ok::<_, InstantiateError>(Arc::new(
                Recorder::new(&format!("{template} (Clone)"), &log).delay(Duration::ZERO),
            ))
        }
    };
    let templates = vec![
        Template::new("Hud").with_component(ComponentFn::<Recorder, _>::arc(make.clone())),
        Template::new("Audio").with_component(ComponentFn::<Recorder, _>::arc(make)),
    ];

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .with_templates(templates)
        .build();
    let outcome = orch.run().await.expect("run");

    assert_eq!(outcome.report().expect("completed").participants(), 2);
    assert_eq!(calls_of(&log, "Hud (Clone)"), Phase::ALL);
    assert_eq!(calls_of(&log, "Audio (Clone)"), Phase::ALL);
}

#[tokio::test]
async fn new_run_cancels_stale_waiters() {
    let signal = InitSignal::default();
    signal.notify_started();

    let stale = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait(&CancellationToken::new()).await })
    };
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(Scene::new("Field")))
        .with_signal(signal.clone())
        .build();
    orch.run().await.expect("run");

    assert!(matches!(stale.await.unwrap(), Err(WaitError::CycleCancelled)));
    signal
        .wait(&CancellationToken::new())
        .await
        .expect("late waiter sees completion");
}

struct Hung;

impl Node for Hung {
    fn name(&self) -> &str {
        "Hung"
    }
}

#[async_trait]
impl Behaviour for Hung {
    async fn on_ui_initialize(&self, _ctx: &PhaseContext) -> Result<(), PhaseError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn phase_deadline_records_timeout_and_barrier_completes() {
    let log: Log = Log::default();
    let scene = Scene::new("Field")
        .with_target(Arc::new(Hung))
        .with_target(Arc::new(Recorder::new("steady", &log)));
    let cfg = Config {
        phase_timeout: Duration::from_millis(100),
        ..Config::default()
    };

    let orch = Orchestrator::builder(cfg)
        .with_environment(Arc::new(scene))
        .build();
    let outcome = orch.run().await.expect("run");

    let report = outcome.report().expect("completed");
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].participant, "Hung");
    assert_eq!(failures[0].phase, Phase::UiInitialize);
    assert!(matches!(failures[0].error, PhaseError::Timeout { .. }));
    assert_eq!(calls_of(&log, "steady"), Phase::ALL);
}

struct Gatekeeper {
    entered: Arc<Notify>,
}

impl Node for Gatekeeper {
    fn name(&self) -> &str {
        "Gatekeeper"
    }
}

#[async_trait]
impl Behaviour for Gatekeeper {
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        self.entered.notify_one();
        ctx.token().cancelled().await;
        Err(PhaseError::Canceled)
    }
}

#[tokio::test]
async fn cancellation_fails_the_signal() {
    let entered = Arc::new(Notify::new());
    let scene = Scene::new("Field").with_target(Arc::new(Gatekeeper {
        entered: Arc::clone(&entered),
    }));

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .build();
    let run = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move { orch.run().await })
    };

    entered.notified().await;
    orch.cancel();

    let res = run.await.unwrap();
    assert!(matches!(
        res,
        Err(RuntimeError::Canceled { stage: "ui_initialize" })
    ));

    match orch.signal().wait(&CancellationToken::new()).await {
        Err(WaitError::Failed(e)) => {
            assert_eq!(e.to_string(), "orchestration cancelled before ui_initialize")
        }
        other => panic!("unexpected: {other:?}"),
    }
}

struct CorruptHierarchy;

impl Node for CorruptHierarchy {
    fn name(&self) -> &str {
        "CorruptHierarchy"
    }

    fn children(&self) -> Vec<TargetRef> {
        panic!("hierarchy corrupted")
    }
}

impl Behaviour for CorruptHierarchy {}

#[tokio::test]
async fn discovery_panic_fails_the_run_and_the_signal() {
    let probe = Arc::new(Probe::default());
    let scene = Scene::new("Field").with_target(Arc::new(CorruptHierarchy));

    let orch = Orchestrator::builder(Config::default())
        .with_environment(Arc::new(scene))
        .with_subscribers(vec![probe.clone() as Arc<dyn Subscribe>])
        .build();
    assert_eq!(orch.subscriber_count(), 1);

    match orch.run().await {
        Err(RuntimeError::Panicked { info }) => assert_eq!(&*info, "hierarchy corrupted"),
        other => panic!("unexpected: {other:?}"),
    }

    assert!(matches!(orch.signal().state(), Some(CycleState::Failed(_))));
    match orch.signal().wait(&CancellationToken::new()).await {
        Err(WaitError::Failed(e)) => {
            assert_eq!(e.to_string(), "orchestration panicked: hierarchy corrupted")
        }
        other => panic!("unexpected: {other:?}"),
    }

    probe.wait_for(EventKind::LifecycleFailed).await;
    assert_eq!(probe.count(EventKind::LifecycleCompleted), 0);
}
