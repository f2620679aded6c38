//! Replay command handler.
//!
//! Builds a `SimulatedHost` from the script, subscribes the selected
//! streams with teardown bound to a dedicated affinity thread, delivers
//! each step from a blocking dispatch thread, and collects whatever every
//! subscription produced after each step. Subscriptions are cancelled from
//! the async runtime, so their listeners are unregistered through the
//! affinity queue before the thread is shut down.

use std::sync::Arc;

use clap::ValueEnum;
use dialoguer::Confirm;
use serde::Serialize;
use serde_json::{Value, json};
use tabled::Tabled;
use tracing::{debug, info, warn};

use wifiwatch_core::{
    AccessPoint, AffinityScheduler, AffinityThread, ConfirmationSurface, ConnectionInfo,
    ConnectionState, HostContext, LocationPrompt, Observable, ReactiveWifi, SignalLevel,
    SimulatedHost, Subscription, SupplicantState, WifiError, is_location_enabled,
    request_location_access,
};

use crate::cli::{GlobalOpts, ReplayArgs, StreamKind};
use crate::config::Config;
use crate::error::CliError;
use crate::output;
use crate::script::Script;

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ReplayRow {
    /// 0 for what arrived on subscribe, then 1-based script steps.
    step: usize,
    stream: &'static str,
    value: Value,
    #[serde(skip)]
    summary: String,
    #[serde(skip)]
    failed: bool,
}

#[derive(Tabled)]
struct ReplayTableRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Stream")]
    stream: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

// ── Human-readable summaries ────────────────────────────────────────

trait Summary {
    fn summary(&self) -> String;
}

impl Summary for Vec<AccessPoint> {
    fn summary(&self) -> String {
        if self.is_empty() {
            return "no networks".into();
        }
        self.iter()
            .map(|ap| format!("{} ({} dBm, {})", ap.ssid, ap.rssi, ap.band()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Summary for ConnectionInfo {
    fn summary(&self) -> String {
        match &self.bssid {
            Some(bssid) => format!("{} via {bssid}, {} dBm", self.ssid, self.rssi),
            None => format!("{}, {} dBm", self.ssid, self.rssi),
        }
    }
}

impl Summary for bool {
    fn summary(&self) -> String {
        String::from(if *self { "on" } else { "off" })
    }
}

impl Summary for u32 {
    fn summary(&self) -> String {
        format!("level {self}")
    }
}

macro_rules! summary_via_display {
    ($($ty:ty),*) => {
        $(impl Summary for $ty {
            fn summary(&self) -> String {
                self.to_string()
            }
        })*
    };
}

summary_via_display!(SignalLevel, SupplicantState, ConnectionState);

// ── Subscription taps ───────────────────────────────────────────────

/// Type-erased view over one live subscription.
trait Tap: Send {
    fn name(&self) -> &'static str;

    /// Everything delivered since the last drain, in order.
    fn drain(&mut self) -> Vec<Result<(Value, String), WifiError>>;

    fn cancel(&mut self);
}

impl<T> Tap for Subscription<T>
where
    T: Serialize + Summary + Send,
{
    fn name(&self) -> &'static str {
        Subscription::name(self)
    }

    fn drain(&mut self) -> Vec<Result<(Value, String), WifiError>> {
        std::iter::from_fn(|| self.try_next())
            .map(|item| {
                let value = item?;
                let json = serde_json::to_value(&value).unwrap_or(Value::Null);
                Ok((json, value.summary()))
            })
            .collect()
    }

    fn cancel(&mut self) {
        Subscription::cancel(self);
    }
}

fn tap<T>(observable: &Observable<T>) -> Box<dyn Tap>
where
    T: Clone + Serialize + Summary + Send + 'static,
{
    Box::new(observable.subscribe())
}

fn subscribe(wifi: &ReactiveWifi, kind: StreamKind, levels: u32) -> Box<dyn Tap> {
    match kind {
        StreamKind::AccessPoints => tap(&wifi.observe_access_points()),
        StreamKind::SignalLevel if levels == SignalLevel::COUNT => {
            tap(&wifi.observe_signal_level())
        }
        StreamKind::SignalLevel => tap(&wifi.observe_signal_level_with(levels)),
        StreamKind::SupplicantState => tap(&wifi.observe_supplicant_state()),
        StreamKind::ConnectionInfo => tap(&wifi.observe_connection_info()),
        StreamKind::ConnectionState => tap(&wifi.observe_connection_state()),
        StreamKind::WifiOnOff => tap(&wifi.observe_wifi_on_off()),
    }
}

fn collect(taps: &mut [Box<dyn Tap>], step: usize, rows: &mut Vec<ReplayRow>) {
    for tap in taps {
        let stream = tap.name();
        for item in tap.drain() {
            let row = match item {
                Ok((value, summary)) => ReplayRow {
                    step,
                    stream,
                    value,
                    summary,
                    failed: false,
                },
                Err(e) => {
                    warn!(stream, error = %e, "stream failed");
                    ReplayRow {
                        step,
                        stream,
                        value: json!({ "error": e.to_string() }),
                        summary: format!("error: {e}"),
                        failed: true,
                    }
                }
            };
            rows.push(row);
        }
    }
}

// ── Location prompt ─────────────────────────────────────────────────

/// Terminal confirmation that turns the simulated location service on.
struct TerminalPrompt {
    assume_yes: bool,
    host: Arc<SimulatedHost>,
}

impl ConfirmationSurface for TerminalPrompt {
    fn confirm(&self, prompt: &LocationPrompt) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(format!("{}\n{}", prompt.title, prompt.message))
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                warn!(error = %e, "cannot prompt for location access, treating as declined");
                false
            })
    }

    fn open_location_settings(&self) {
        info!("opening location settings");
        self.host.set_location(true, true);
    }
}

/// Ask for location access on a blocking thread; the terminal prompt
/// waits on stdin.
async fn ensure_location(
    host: &Arc<SimulatedHost>,
    assume_yes: bool,
    prompt: LocationPrompt,
) -> Result<bool, CliError> {
    let surface = TerminalPrompt {
        assume_yes,
        host: Arc::clone(host),
    };
    tokio::task::spawn_blocking(move || request_location_access(&surface, &prompt))
        .await
        .map_err(|e| CliError::Runtime {
            message: format!("location prompt failed: {e}"),
        })
}

fn selected_streams(requested: &[StreamKind]) -> Vec<StreamKind> {
    if requested.is_empty() {
        return StreamKind::value_variants().to_vec();
    }
    let mut selected = Vec::with_capacity(requested.len());
    for kind in requested {
        if !selected.contains(kind) {
            selected.push(*kind);
        }
    }
    selected
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &ReplayArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let script = Script::load(&args.script)?;
    let host = Arc::new(script.host());
    let mut streams = selected_streams(&args.streams);

    // Scan results need location; ask before subscribing to them.
    if streams.contains(&StreamKind::AccessPoints) && !is_location_enabled(host.as_ref()) {
        if !ensure_location(&host, global.yes, cfg.location.prompt()).await? {
            warn!("location is off, skipping access point stream");
            streams.retain(|kind| *kind != StreamKind::AccessPoints);
        }
    }

    let affinity = AffinityThread::spawn(cfg.affinity.thread_name.clone())?;
    let context: Arc<dyn HostContext> = host.clone();
    let scheduler: Arc<dyn AffinityScheduler> = affinity.clone();
    let wifi = ReactiveWifi::new(context, scheduler);

    let mut taps: Vec<Box<dyn Tap>> = streams
        .iter()
        .map(|kind| subscribe(&wifi, *kind, cfg.signal.levels))
        .collect();

    let mut rows = Vec::new();
    collect(&mut taps, 0, &mut rows);

    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        let dispatcher = Arc::clone(&host);
        let step = step.clone();
        let delivered = tokio::task::spawn_blocking(move || {
            step.prepare(dispatcher.radio_handle().map(Arc::as_ref));
            dispatcher.deliver(&step.notification())
        })
        .await
        .map_err(|e| CliError::Runtime {
            message: format!("dispatch of step {number} failed: {e}"),
        })?;
        debug!(step = number, listeners = delivered, "step delivered");
        collect(&mut taps, number, &mut rows);
    }

    // Off the affinity thread, so teardown is queued rather than inline.
    for tap in &mut taps {
        tap.cancel();
    }
    drop(taps);
    affinity.shutdown();
    info!(
        registered = host.registrations(),
        unregistered = host.unregistrations(),
        "replay finished"
    );

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &rows,
        |r| ReplayTableRow {
            step: r.step,
            stream: r.stream,
            value: if r.failed {
                output::paint_error(&r.summary, color)
            } else {
                r.summary.clone()
            },
        },
        |r| format!("{}\t{}\t{}", r.step, r.stream, r.summary),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wifiwatch_core::InlineScheduler;

    use super::*;

    #[test]
    fn empty_selection_means_every_stream() {
        assert_eq!(selected_streams(&[]).len(), 6);
        assert_eq!(
            selected_streams(&[StreamKind::WifiOnOff, StreamKind::WifiOnOff]),
            vec![StreamKind::WifiOnOff]
        );
    }

    #[test]
    fn taps_collect_defaults_and_failures() {
        let host = Arc::new(SimulatedHost::without_radio());
        let context: Arc<dyn HostContext> = host.clone();
        let wifi = ReactiveWifi::new(context, Arc::new(InlineScheduler));

        let mut taps = vec![
            subscribe(&wifi, StreamKind::SupplicantState, 5),
            subscribe(&wifi, StreamKind::AccessPoints, 5),
        ];
        let mut rows = Vec::new();
        collect(&mut taps, 0, &mut rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stream, "supplicant_state");
        assert_eq!(rows[0].value, json!("UNINITIALIZED"));
        assert!(!rows[0].failed);
        assert_eq!(rows[1].stream, "access_points");
        assert!(rows[1].failed);
    }

    #[tokio::test]
    async fn confirmed_location_prompt_enables_location() {
        let host = Arc::new(SimulatedHost::new());
        host.set_location(false, false);
        assert!(!is_location_enabled(host.as_ref()));

        let granted = ensure_location(&host, true, LocationPrompt::default())
            .await
            .unwrap();
        assert!(granted);
        assert!(is_location_enabled(host.as_ref()));
    }

    #[test]
    fn summaries_are_readable() {
        assert_eq!(true.summary(), "on");
        assert_eq!(3_u32.summary(), "level 3");
        assert_eq!(Vec::<AccessPoint>::new().summary(), "no networks");
        assert_eq!(SignalLevel::Good.summary(), "good");
    }
}
