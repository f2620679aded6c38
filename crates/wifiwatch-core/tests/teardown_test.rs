#![allow(clippy::unwrap_used)]
// Integration tests for listener teardown through the affinity thread.

use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing_subscriber::fmt::MakeWriter;

use wifiwatch_core::{
    AffinityScheduler, AffinityThread, HostContext, InlineScheduler, Notification, ReactiveWifi,
    SimulatedHost,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn wifi_on(host: &Arc<SimulatedHost>, scheduler: Arc<dyn AffinityScheduler>) -> ReactiveWifi {
    let context: Arc<dyn HostContext> = host.clone();
    ReactiveWifi::new(context, scheduler)
}

/// Block until every task queued on `affinity` so far has run.
fn drain(affinity: &AffinityThread) {
    let (tx, rx) = oneshot::channel();
    affinity.schedule(Box::new(move || {
        let _ = tx.send(());
    }));
    rx.blocking_recv().unwrap();
}

fn on() -> Notification {
    Notification::SupplicantConnectionChanged {
        connected: Some(true),
    }
}

/// Log sink shared between the test and a scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ── Affinity handoff ────────────────────────────────────────────────

#[test]
fn test_cancel_on_affinity_thread_unregisters_inline() {
    let affinity = AffinityThread::spawn("wifiwatch-test").unwrap();
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, affinity.clone());
    let sub = wifi.observe_wifi_on_off().subscribe();

    let (tx, rx) = oneshot::channel();
    let observed = Arc::clone(&host);
    affinity.schedule(Box::new(move || {
        let mut sub = sub;
        sub.cancel();
        // Already unregistered by the time cancel returns.
        let _ = tx.send(observed.unregistrations());
    }));

    assert_eq!(rx.blocking_recv().unwrap(), 1);
    assert_eq!(host.unregister_threads(), vec![affinity.thread_id()]);
}

#[test]
fn test_cancel_off_thread_is_deferred() {
    let affinity = AffinityThread::spawn("wifiwatch-test").unwrap();
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, affinity.clone());
    let mut sub = wifi.observe_wifi_on_off().subscribe();

    // Hold the affinity thread so the teardown stays queued.
    let (release, gate) = oneshot::channel::<()>();
    affinity.schedule(Box::new(move || {
        let _ = gate.blocking_recv();
    }));

    sub.cancel();
    assert!(sub.is_cancelled());
    assert!(sub.is_disposed());
    assert_eq!(host.unregistrations(), 0);
    assert_eq!(host.active_listeners(), 1);

    // Still registered, but nothing reaches the cancelled subscription.
    assert_eq!(host.deliver(&on()), 1);
    assert_eq!(sub.try_next(), None);

    release.send(()).unwrap();
    drain(&affinity);

    assert_eq!(host.unregistrations(), 1);
    assert_eq!(host.active_listeners(), 0);
    assert_eq!(host.unregister_threads(), vec![affinity.thread_id()]);
}

#[test]
fn test_teardown_runs_once_across_cancel_and_drop() {
    let affinity = AffinityThread::spawn("wifiwatch-test").unwrap();
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, affinity.clone());

    let mut sub = wifi.observe_signal_level().subscribe();
    sub.cancel();
    sub.cancel();
    drop(sub);
    drain(&affinity);

    assert_eq!(host.unregistrations(), 1);
    assert_eq!(host.failed_unregistrations(), 0);
}

#[test]
fn test_many_subscriptions_each_unregister_once() {
    let affinity = AffinityThread::spawn("wifiwatch-test").unwrap();
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, affinity.clone());

    let subs: Vec<_> = (0..8)
        .map(|_| wifi.observe_connection_state().subscribe())
        .collect();
    assert_eq!(host.active_listeners(), 8);

    drop(subs);
    drain(&affinity);
    assert_eq!(host.unregistrations(), 8);
    assert_eq!(host.active_listeners(), 0);
}

#[test]
fn test_cancel_after_affinity_shutdown_keeps_listener_and_warns() {
    let affinity = AffinityThread::spawn("wifiwatch-test").unwrap();
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, affinity.clone());
    let mut sub = wifi.observe_wifi_on_off().subscribe();
    affinity.shutdown();

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || sub.cancel());

    // The stream is closed but the teardown task had nowhere to run.
    assert!(sub.is_disposed());
    assert_eq!(sub.try_next(), None);
    assert_eq!(host.unregistrations(), 0);
    assert_eq!(host.active_listeners(), 1);
    let text = logs.contents();
    assert!(
        text.contains("affinity thread is shut down"),
        "Expected dropped-task warning in logs:\n{text}"
    );
}

// ── Double unregistration ───────────────────────────────────────────

#[test]
fn test_already_unregistered_listener_is_only_logged() {
    let host = Arc::new(SimulatedHost::new());
    let wifi = wifi_on(&host, Arc::new(InlineScheduler));
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sub = wifi.observe_wifi_on_off().subscribe();
        host.revoke();
        sub.cancel();
        assert_eq!(sub.try_next(), None);
    });

    assert_eq!(host.failed_unregistrations(), 1);
    assert_eq!(host.unregistrations(), 0);
    let text = logs.contents();
    assert!(
        text.contains("listener was already unregistered"),
        "Expected teardown warning in logs:\n{text}"
    );
}
