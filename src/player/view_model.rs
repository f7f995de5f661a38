//! Player view-model.
//!
//! Mirrors the embedded player's position into a local snapshot by polling,
//! and applies user commands optimistically: the snapshot changes first, the
//! command is sent, and later polls either confirm it or, after a few ticks,
//! overrule it. Polling is suspended while the user drags the scrubber.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::embed::{EmbedState, EmbeddedPlayer, PlayerError};
use crate::config::Config;
use crate::format::format_playback_time;
use crate::models::PlaylistItem;

/// Polled positions within this distance of a pending seek confirm it.
pub const SEEK_TOLERANCE: f64 = 1.5;

/// Polls that may contradict an optimistic change before the player wins.
pub const CONFIRM_TICKS: u8 = 3;

/// `previous()` restarts the current track instead when past this position.
pub const RESTART_THRESHOLD: f64 = 3.0;

pub const DEFAULT_VOLUME: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending<T> {
    value: T,
    ticks_left: u8,
}

impl<T> Pending<T> {
    fn new(value: T) -> Self {
        Pending { value, ticks_left: CONFIRM_TICKS }
    }
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scrubbing in progress, nothing queued, or the track changed mid-poll.
    Suspended,
    Updated,
    /// The track ended and playback moved on (or replayed it).
    Advanced,
    /// The track ended at the end of the queue.
    Stopped,
    /// The player could not be read.
    Failed,
}

#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub queue: Vec<PlaylistItem>,
    pub current_index: usize,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub is_scrubbing: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub volume: u8,
    pub error_message: Option<String>,
    /// Play order over `queue` indices; identity unless shuffled.
    order: Vec<usize>,
    pending_seek: Option<Pending<f64>>,
    pending_play: Option<Pending<bool>>,
    /// Set on track switch so a stale `Ended` from the previous video is ignored.
    awaiting_start: bool,
    /// Bumped whenever the loaded video changes; polls started under an
    /// older generation are dropped.
    generation: u64,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        PlaybackSnapshot {
            queue: Vec::new(),
            current_index: 0,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            is_scrubbing: false,
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: DEFAULT_VOLUME,
            error_message: None,
            order: Vec::new(),
            pending_seek: None,
            pending_play: None,
            awaiting_start: false,
            generation: 0,
        }
    }
}

impl PlaybackSnapshot {
    pub fn current_item(&self) -> Option<&PlaylistItem> {
        self.queue.get(self.current_index)
    }

    pub fn play_order(&self) -> &[usize] {
        &self.order
    }

    pub fn has_pending_seek(&self) -> bool {
        self.pending_seek.is_some()
    }

    pub fn elapsed_text(&self) -> String {
        format_playback_time(self.current_time)
    }

    /// Time left, prefixed with `-`.
    pub fn remaining_text(&self) -> String {
        format!("-{}", format_playback_time((self.duration - self.current_time).max(0.0)))
    }

    /// Position as a fraction of the duration, 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let upper = if self.duration > 0.0 { self.duration } else { f64::MAX };
        if seconds.is_finite() {
            seconds.max(0.0).min(upper)
        } else {
            0.0
        }
    }

    fn order_position(&self) -> Option<usize> {
        self.order.iter().position(|&i| i == self.current_index)
    }

    fn next_index(&self, wrap: bool) -> Option<usize> {
        let pos = self.order_position()?;
        match self.order.get(pos + 1) {
            Some(&index) => Some(index),
            None if wrap => self.order.first().copied(),
            None => None,
        }
    }

    fn previous_index(&self, wrap: bool) -> Option<usize> {
        let pos = self.order_position()?;
        if pos > 0 {
            Some(self.order[pos - 1])
        } else if wrap {
            self.order.last().copied()
        } else {
            None
        }
    }

    fn rebuild_order(&mut self) {
        let mut order: Vec<usize> = (0..self.queue.len()).collect();
        if self.shuffle && !order.is_empty() {
            order.retain(|&i| i != self.current_index);
            order.shuffle(&mut rand::thread_rng());
            order.insert(0, self.current_index);
        }
        self.order = order;
    }
}

struct Shared {
    player: Arc<dyn EmbeddedPlayer>,
    state: Mutex<PlaybackSnapshot>,
}

/// Playback side of the player screen.
///
/// Whether the sheet is open is tracked by [`HomeViewModel`](crate::HomeViewModel)
/// alone, since it also gates the carousel timer.
pub struct PlayerViewModel {
    shared: Arc<Shared>,
    poll_interval: Duration,
    poller: Option<JoinHandle<()>>,
}

impl PlayerViewModel {
    pub fn new(player: Arc<dyn EmbeddedPlayer>, poll_interval: Duration) -> Self {
        PlayerViewModel {
            shared: Arc::new(Shared {
                player,
                state: Mutex::new(PlaybackSnapshot::default()),
            }),
            poll_interval,
            poller: None,
        }
    }

    /// Same as [`PlayerViewModel::new`], polling at `config.poll_interval`.
    pub fn from_config(player: Arc<dyn EmbeddedPlayer>, config: &Config) -> Self {
        Self::new(player, config.poll_interval)
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.state.lock().await.clone()
    }

    /// Replaces the queue and starts playing `items[start_at]`, with the index
    /// clamped into range. An empty list is ignored.
    pub async fn open(&self, items: Vec<PlaylistItem>, start_at: usize) -> Result<(), PlayerError> {
        if items.is_empty() {
            return Ok(());
        }
        let index = start_at.min(items.len() - 1);
        {
            let mut state = self.shared.state.lock().await;
            state.queue = items;
            state.current_index = index;
            state.generation += 1;
            state.rebuild_order();
        }
        self.shared.switch_to(index).await
    }

    pub async fn toggle_play_pause(&self) -> Result<(), PlayerError> {
        let target = {
            let mut state = self.shared.state.lock().await;
            if state.queue.is_empty() {
                return Ok(());
            }
            state.is_playing = !state.is_playing;
            state.pending_play = Some(Pending::new(state.is_playing));
            state.is_playing
        };

        let result = if target {
            self.shared.player.play().await
        } else {
            self.shared.player.pause().await
        };

        if let Err(e) = result {
            let mut state = self.shared.state.lock().await;
            state.is_playing = !target;
            state.pending_play = None;
            state.error_message = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// The user grabbed the scrubber; polls stop touching the snapshot.
    pub async fn begin_scrub(&self) {
        self.shared.state.lock().await.is_scrubbing = true;
    }

    /// Moves the local position while dragging. Nothing is sent to the player.
    pub async fn scrub(&self, seconds: f64) {
        let mut state = self.shared.state.lock().await;
        state.current_time = state.clamp_time(seconds);
    }

    /// The user released the scrubber at `seconds`.
    pub async fn end_scrub(&self, seconds: f64) -> Result<(), PlayerError> {
        self.shared.state.lock().await.is_scrubbing = false;
        self.shared.seek_to(seconds).await
    }

    pub async fn seek_to(&self, seconds: f64) -> Result<(), PlayerError> {
        self.shared.seek_to(seconds).await
    }

    /// Relative seek, e.g. the ±10 s buttons.
    pub async fn seek_by(&self, delta: f64) -> Result<(), PlayerError> {
        let current = self.shared.state.lock().await.current_time;
        self.shared.seek_to(current + delta).await
    }

    /// Skips forward in play order. Wraps around unless repeat is off;
    /// returns `false` when already on the last track with repeat off.
    pub async fn next(&self) -> Result<bool, PlayerError> {
        let next = {
            let state = self.shared.state.lock().await;
            state.next_index(state.repeat != RepeatMode::Off)
        };
        match next {
            Some(index) => self.shared.switch_to(index).await.map(|_| true),
            None => Ok(false),
        }
    }

    /// Restarts the track when past the first few seconds, otherwise steps
    /// back in play order. At the start of the queue with repeat off the
    /// current track restarts.
    pub async fn previous(&self) -> Result<(), PlayerError> {
        let previous = {
            let state = self.shared.state.lock().await;
            if state.queue.is_empty() {
                return Ok(());
            }
            if state.current_time > RESTART_THRESHOLD {
                None
            } else {
                state.previous_index(state.repeat != RepeatMode::Off)
            }
        };
        match previous {
            Some(index) => self.shared.switch_to(index).await,
            None => self.shared.seek_to(0.0).await,
        }
    }

    /// Turns shuffle on or off. The current track stays current either way.
    pub async fn toggle_shuffle(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        state.shuffle = !state.shuffle;
        state.rebuild_order();
        tracing::debug!(shuffle = state.shuffle, "shuffle toggled");
        state.shuffle
    }

    pub async fn cycle_repeat(&self) -> RepeatMode {
        let mut state = self.shared.state.lock().await;
        state.repeat = state.repeat.next();
        state.repeat
    }

    pub async fn set_volume(&self, volume: i32) -> Result<(), PlayerError> {
        let volume = volume.clamp(0, 100) as u8;
        self.shared.state.lock().await.volume = volume;
        self.shared.player.set_volume(volume).await
    }

    /// Runs one poll immediately.
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }

    /// Starts polling the player every poll interval. Restarts a running poller.
    pub fn start_polling(&mut self) {
        self.stop_polling();

        let shared = Arc::clone(&self.shared);
        let period = self.poll_interval;

        self.poller = Some(tokio::spawn(async move {
            tracing::debug!("player polling started (interval: {:?})", period);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                shared.tick().await;
            }
        }));
    }

    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            tracing::debug!("player polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PlayerViewModel {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

impl Shared {
    async fn switch_to(&self, index: usize) -> Result<(), PlayerError> {
        let video_id = {
            let mut state = self.state.lock().await;
            let Some(item) = state.queue.get(index) else {
                return Ok(());
            };
            let video_id = item.video_id().to_string();
            state.current_index = index;
            state.current_time = 0.0;
            state.duration = 0.0;
            state.pending_seek = None;
            state.is_playing = true;
            state.pending_play = Some(Pending::new(true));
            state.awaiting_start = true;
            state.generation += 1;
            video_id
        };

        tracing::info!(video_id = %video_id, index, "loading track");

        let result = match self.player.load(&video_id).await {
            Ok(()) => self.player.play().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let mut state = self.state.lock().await;
            state.is_playing = false;
            state.pending_play = None;
            state.error_message = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), PlayerError> {
        let (target, previous) = {
            let mut state = self.state.lock().await;
            if state.queue.is_empty() {
                return Ok(());
            }
            let target = state.clamp_time(seconds);
            let previous = state.current_time;
            state.current_time = target;
            state.pending_seek = Some(Pending::new(target));
            (target, previous)
        };

        if let Err(e) = self.player.seek(target).await {
            let mut state = self.state.lock().await;
            state.current_time = previous;
            state.pending_seek = None;
            state.error_message = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    async fn tick(&self) -> TickOutcome {
        let generation = {
            let state = self.state.lock().await;
            if state.is_scrubbing || state.queue.is_empty() {
                return TickOutcome::Suspended;
            }
            state.generation
        };

        let reading = async {
            let embed_state = self.player.state().await?;
            let time = self.player.current_time().await?;
            let duration = self.player.duration().await?;
            Ok::<_, PlayerError>((embed_state, time, duration))
        };
        let (embed_state, time, duration) = match reading.await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::debug!("player poll failed: {}", e);
                return TickOutcome::Failed;
            }
        };

        let ended = {
            let mut state = self.state.lock().await;
            // The user may have grabbed the scrubber while we were reading.
            if state.is_scrubbing {
                return TickOutcome::Suspended;
            }
            // The track changed while we were reading; the values belong to the old video.
            if state.generation != generation {
                tracing::debug!("dropping poll of a replaced track");
                return TickOutcome::Suspended;
            }

            if duration.is_finite() && duration > 0.0 {
                state.duration = duration;
            }

            reconcile_position(&mut state, time);
            reconcile_playing(&mut state, embed_state);

            match embed_state {
                EmbedState::Playing | EmbedState::Buffering => state.awaiting_start = false,
                _ => {}
            }

            embed_state == EmbedState::Ended && !state.awaiting_start && state.pending_seek.is_none()
        };

        if ended {
            self.advance_after_end().await
        } else {
            TickOutcome::Updated
        }
    }

    async fn advance_after_end(&self) -> TickOutcome {
        let (repeat, next) = {
            let state = self.state.lock().await;
            (state.repeat, state.next_index(state.repeat == RepeatMode::All))
        };

        if repeat == RepeatMode::One {
            tracing::debug!("repeating track");
            {
                let mut state = self.state.lock().await;
                state.awaiting_start = true;
                state.generation += 1;
                state.is_playing = true;
                state.pending_play = Some(Pending::new(true));
            }
            let result = match self.seek_to(0.0).await {
                Ok(()) => self.player.play().await,
                Err(e) => Err(e),
            };
            return match result {
                Ok(()) => TickOutcome::Advanced,
                Err(e) => {
                    tracing::warn!("replay failed: {}", e);
                    TickOutcome::Failed
                }
            };
        }

        match next {
            Some(index) => match self.switch_to(index).await {
                Ok(()) => TickOutcome::Advanced,
                Err(e) => {
                    tracing::warn!("advancing to track {} failed: {}", index, e);
                    TickOutcome::Failed
                }
            },
            None => {
                let mut state = self.state.lock().await;
                state.is_playing = false;
                state.pending_play = None;
                state.current_time = state.duration;
                state.awaiting_start = true;
                tracing::info!("reached end of queue");
                TickOutcome::Stopped
            }
        }
    }
}

fn reconcile_position(state: &mut PlaybackSnapshot, polled: f64) {
    match state.pending_seek {
        Some(pending) if (polled - pending.value).abs() <= SEEK_TOLERANCE => {
            state.pending_seek = None;
            state.current_time = state.clamp_time(polled);
        }
        Some(pending) if pending.ticks_left == 0 => {
            tracing::debug!(target = pending.value, polled, "seek not confirmed, accepting player position");
            state.pending_seek = None;
            state.current_time = state.clamp_time(polled);
        }
        Some(mut pending) => {
            pending.ticks_left -= 1;
            state.pending_seek = Some(pending);
        }
        None => state.current_time = state.clamp_time(polled),
    }
}

fn reconcile_playing(state: &mut PlaybackSnapshot, embed_state: EmbedState) {
    let reported = match embed_state {
        EmbedState::Playing => true,
        EmbedState::Paused | EmbedState::Ended => false,
        EmbedState::Unstarted | EmbedState::Buffering | EmbedState::Cued => return,
    };

    match state.pending_play {
        Some(pending) if pending.value == reported => {
            state.pending_play = None;
            state.is_playing = reported;
        }
        Some(pending) if pending.ticks_left == 0 => {
            state.pending_play = None;
            state.is_playing = reported;
        }
        Some(mut pending) => {
            pending.ticks_left -= 1;
            state.pending_play = Some(pending);
        }
        None => state.is_playing = reported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlaylistItemSnippet, ResourceId};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    #[derive(Debug)]
    struct MockState {
        state: EmbedState,
        time: f64,
        duration: f64,
        loaded: Vec<String>,
        seeks: Vec<f64>,
        /// When false, seeks are recorded but the reported time does not move.
        apply_seeks: bool,
        fail_commands: bool,
        volume: u8,
        /// Holds `duration()` until `release` is notified.
        hold_duration: bool,
    }

    struct MockPlayer {
        inner: StdMutex<MockState>,
        held: Notify,
        release: Notify,
    }

    impl MockPlayer {
        fn new() -> Arc<Self> {
            Arc::new(MockPlayer {
                inner: StdMutex::new(MockState {
                    state: EmbedState::Unstarted,
                    time: 0.0,
                    duration: 200.0,
                    loaded: Vec::new(),
                    seeks: Vec::new(),
                    apply_seeks: true,
                    fail_commands: false,
                    volume: 100,
                    hold_duration: false,
                }),
                held: Notify::new(),
                release: Notify::new(),
            })
        }

        fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
            f(&mut self.inner.lock().unwrap())
        }

        fn check(&self) -> Result<(), PlayerError> {
            if self.with(|s| s.fail_commands) {
                Err(PlayerError::Command("bridge gone".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl EmbeddedPlayer for MockPlayer {
        async fn load(&self, video_id: &str) -> Result<(), PlayerError> {
            self.check()?;
            self.with(|s| {
                s.loaded.push(video_id.to_string());
                s.time = 0.0;
                s.state = EmbedState::Buffering;
            });
            Ok(())
        }

        async fn play(&self) -> Result<(), PlayerError> {
            self.check()?;
            self.with(|s| s.state = EmbedState::Playing);
            Ok(())
        }

        async fn pause(&self) -> Result<(), PlayerError> {
            self.check()?;
            self.with(|s| s.state = EmbedState::Paused);
            Ok(())
        }

        async fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
            self.check()?;
            self.with(|s| {
                s.seeks.push(seconds);
                if s.apply_seeks {
                    s.time = seconds;
                }
            });
            Ok(())
        }

        async fn set_volume(&self, volume: u8) -> Result<(), PlayerError> {
            self.with(|s| s.volume = volume);
            Ok(())
        }

        async fn current_time(&self) -> Result<f64, PlayerError> {
            Ok(self.with(|s| s.time))
        }

        async fn duration(&self) -> Result<f64, PlayerError> {
            if self.with(|s| s.hold_duration) {
                self.held.notify_one();
                self.release.notified().await;
            }
            Ok(self.with(|s| s.duration))
        }

        async fn state(&self) -> Result<EmbedState, PlayerError> {
            Ok(self.with(|s| s.state))
        }
    }

    fn item(video_id: &str) -> PlaylistItem {
        PlaylistItem {
            id: format!("item-{}", video_id),
            snippet: PlaylistItemSnippet {
                title: format!("Title {}", video_id),
                resource_id: ResourceId { video_id: video_id.to_string() },
                view_count: None,
                thumbnails: None,
                published_at: None,
            },
        }
    }

    fn queue(n: usize) -> Vec<PlaylistItem> {
        (0..n).map(|i| item(&format!("v{}", i))).collect()
    }

    fn view_model(player: &Arc<MockPlayer>) -> PlayerViewModel {
        let player: Arc<dyn EmbeddedPlayer> = player.clone();
        PlayerViewModel::new(player, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn open_clamps_index_and_loads() {
        let player = MockPlayer::new();
        let vm = view_model(&player);

        vm.open(queue(3), 10).await.unwrap();

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_index, 2);
        assert!(snap.is_playing);
        assert_eq!(player.with(|s| s.loaded.clone()), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn open_with_empty_queue_is_ignored() {
        let player = MockPlayer::new();
        let vm = view_model(&player);

        vm.open(Vec::new(), 0).await.unwrap();

        assert!(vm.snapshot().await.queue.is_empty());
        assert!(player.with(|s| s.loaded.is_empty()));
        assert_eq!(vm.tick().await, TickOutcome::Suspended);
    }

    #[tokio::test]
    async fn tick_mirrors_player_position() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        player.with(|s| s.time = 42.0);
        assert_eq!(vm.tick().await, TickOutcome::Updated);

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_time, 42.0);
        assert_eq!(snap.duration, 200.0);
        assert_eq!(snap.elapsed_text(), "0:42");
        assert_eq!(snap.remaining_text(), "-2:38");
        assert!((snap.progress() - 0.21).abs() < 1e-9);
    }

    #[tokio::test]
    async fn scrubbing_suspends_polling() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        vm.begin_scrub().await;
        vm.scrub(120.0).await;
        player.with(|s| s.time = 10.0);

        assert_eq!(vm.tick().await, TickOutcome::Suspended);
        assert_eq!(vm.snapshot().await.current_time, 120.0);
        assert!(player.with(|s| s.seeks.is_empty()));
    }

    #[tokio::test]
    async fn scrub_is_clamped_to_duration() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();
        vm.tick().await;

        vm.begin_scrub().await;
        vm.scrub(999.0).await;
        assert_eq!(vm.snapshot().await.current_time, 200.0);
        vm.scrub(-5.0).await;
        assert_eq!(vm.snapshot().await.current_time, 0.0);
    }

    #[tokio::test]
    async fn end_scrub_seeks_and_is_confirmed() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        vm.begin_scrub().await;
        vm.end_scrub(90.0).await.unwrap();

        let snap = vm.snapshot().await;
        assert!(!snap.is_scrubbing);
        assert_eq!(snap.current_time, 90.0);
        assert!(snap.has_pending_seek());
        assert_eq!(player.with(|s| s.seeks.clone()), vec![90.0]);

        player.with(|s| s.time = 90.4);
        vm.tick().await;
        let snap = vm.snapshot().await;
        assert!(!snap.has_pending_seek());
        assert_eq!(snap.current_time, 90.4);
    }

    #[tokio::test]
    async fn stale_positions_are_ignored_until_seek_lands() {
        let player = MockPlayer::new();
        player.with(|s| s.apply_seeks = false);
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        player.with(|s| s.time = 5.0);
        vm.seek_to(100.0).await.unwrap();

        for _ in 0..CONFIRM_TICKS {
            vm.tick().await;
            assert_eq!(vm.snapshot().await.current_time, 100.0);
        }

        // The player never moved; its position wins.
        vm.tick().await;
        let snap = vm.snapshot().await;
        assert!(!snap.has_pending_seek());
        assert_eq!(snap.current_time, 5.0);
    }

    #[tokio::test]
    async fn failed_seek_reverts_position() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();
        player.with(|s| s.time = 12.0);
        vm.tick().await;

        player.with(|s| s.fail_commands = true);
        assert!(vm.seek_to(150.0).await.is_err());

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_time, 12.0);
        assert!(!snap.has_pending_seek());
        assert!(snap.error_message.is_some());
    }

    #[tokio::test]
    async fn seek_by_is_relative() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();
        player.with(|s| s.time = 30.0);
        vm.tick().await;

        vm.seek_by(-10.0).await.unwrap();
        assert_eq!(player.with(|s| s.seeks.clone()), vec![20.0]);
    }

    #[tokio::test]
    async fn play_pause_is_optimistic_until_confirmed() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();
        vm.tick().await;
        assert!(vm.snapshot().await.is_playing);

        vm.toggle_play_pause().await.unwrap();
        assert!(!vm.snapshot().await.is_playing);
        assert_eq!(player.with(|s| s.state), EmbedState::Paused);

        // A late "Playing" report does not undo the pause right away.
        player.with(|s| s.state = EmbedState::Playing);
        vm.tick().await;
        assert!(!vm.snapshot().await.is_playing);
    }

    #[tokio::test]
    async fn failed_toggle_reverts() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        player.with(|s| s.fail_commands = true);
        assert!(vm.toggle_play_pause().await.is_err());

        let snap = vm.snapshot().await;
        assert!(snap.is_playing);
        assert_eq!(snap.error_message.as_deref(), Some("Player command failed: bridge gone"));
    }

    #[tokio::test]
    async fn ended_track_advances() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(3), 0).await.unwrap();
        vm.tick().await;

        player.with(|s| s.state = EmbedState::Ended);
        assert_eq!(vm.tick().await, TickOutcome::Advanced);

        assert_eq!(vm.snapshot().await.current_index, 1);
        assert_eq!(player.with(|s| s.loaded.clone()), vec!["v0".to_string(), "v1".to_string()]);
    }

    #[tokio::test]
    async fn stale_ended_after_switch_is_ignored() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(3), 0).await.unwrap();

        // The new video has not reported Playing yet.
        player.with(|s| s.state = EmbedState::Ended);
        assert_eq!(vm.tick().await, TickOutcome::Updated);
        assert_eq!(vm.snapshot().await.current_index, 0);
    }

    #[tokio::test]
    async fn end_of_queue_stops_without_repeat() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(2), 1).await.unwrap();
        vm.tick().await;

        player.with(|s| s.state = EmbedState::Ended);
        assert_eq!(vm.tick().await, TickOutcome::Stopped);

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_index, 1);
        assert!(!snap.is_playing);
        assert_eq!(player.with(|s| s.loaded.len()), 1);
    }

    #[tokio::test]
    async fn repeat_all_wraps_and_repeat_one_replays() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(2), 1).await.unwrap();
        vm.tick().await;

        assert_eq!(vm.cycle_repeat().await, RepeatMode::All);
        player.with(|s| s.state = EmbedState::Ended);
        assert_eq!(vm.tick().await, TickOutcome::Advanced);
        assert_eq!(vm.snapshot().await.current_index, 0);

        vm.tick().await;
        assert_eq!(vm.cycle_repeat().await, RepeatMode::One);
        player.with(|s| {
            s.time = 200.0;
            s.state = EmbedState::Ended;
        });
        assert_eq!(vm.tick().await, TickOutcome::Advanced);

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_index, 0);
        assert_eq!(player.with(|s| s.seeks.clone()), vec![0.0]);
        assert_eq!(player.with(|s| s.state), EmbedState::Playing);
    }

    #[tokio::test]
    async fn next_and_previous() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(3), 0).await.unwrap();

        assert!(vm.next().await.unwrap());
        assert!(vm.next().await.unwrap());
        assert!(!vm.next().await.unwrap());
        assert_eq!(vm.snapshot().await.current_index, 2);

        vm.previous().await.unwrap();
        assert_eq!(vm.snapshot().await.current_index, 1);

        // Past the restart threshold, previous restarts the track.
        player.with(|s| s.time = 30.0);
        vm.tick().await;
        vm.previous().await.unwrap();
        let snap = vm.snapshot().await;
        assert_eq!(snap.current_index, 1);
        assert_eq!(snap.current_time, 0.0);
    }

    #[tokio::test]
    async fn shuffle_keeps_current_first_and_covers_queue() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(6), 3).await.unwrap();

        assert!(vm.toggle_shuffle().await);
        let snap = vm.snapshot().await;
        let mut order = snap.play_order().to_vec();
        assert_eq!(order[0], 3);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);

        let mut visited = vec![3];
        while vm.next().await.unwrap() {
            visited.push(vm.snapshot().await.current_index);
        }
        assert_eq!(visited, snap.play_order());

        assert!(!vm.toggle_shuffle().await);
        assert_eq!(vm.snapshot().await.play_order(), &[0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn volume_is_clamped() {
        let player = MockPlayer::new();
        let vm = view_model(&player);

        vm.set_volume(140).await.unwrap();
        assert_eq!(vm.snapshot().await.volume, 100);
        vm.set_volume(-3).await.unwrap();
        assert_eq!(player.with(|s| s.volume), 0);
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polling_task_updates_and_stops() {
        let player = MockPlayer::new();
        let mut vm = view_model(&player);
        vm.open(queue(1), 0).await.unwrap();

        player.with(|s| s.time = 7.0);
        vm.start_polling();
        assert!(vm.is_polling());
        // The first poll runs right away.
        settle().await;
        assert_eq!(vm.snapshot().await.current_time, 7.0);

        player.with(|s| s.time = 8.0);
        tokio::time::advance(Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(vm.snapshot().await.current_time, 8.0);

        vm.stop_polling();
        assert!(!vm.is_polling());
        player.with(|s| s.time = 50.0);
        tokio::time::advance(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(vm.snapshot().await.current_time, 8.0);
    }

    #[tokio::test(start_paused = true)]
    async fn from_config_polls_at_configured_interval() {
        let player = MockPlayer::new();
        let config = Config::default().with_poll_interval(Duration::from_secs(2));
        let mut vm = PlayerViewModel::from_config(player.clone(), &config);
        vm.open(queue(1), 0).await.unwrap();

        vm.start_polling();
        settle().await;
        player.with(|s| s.time = 12.0);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(vm.snapshot().await.current_time, 0.0);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(vm.snapshot().await.current_time, 12.0);
    }

    #[tokio::test]
    async fn poll_in_flight_during_track_switch_is_dropped() {
        let player = MockPlayer::new();
        let vm = view_model(&player);
        vm.open(queue(3), 0).await.unwrap();
        vm.tick().await;

        player.with(|s| {
            s.time = 250.0;
            s.duration = 300.0;
            s.hold_duration = true;
        });

        // The poll has read `Playing` at 250 s of v0 when the user skips ahead.
        let (outcome, ()) = tokio::join!(vm.tick(), async {
            player.held.notified().await;
            assert!(vm.next().await.unwrap());
            player.with(|s| s.hold_duration = false);
            player.release.notify_one();
        });
        assert_eq!(outcome, TickOutcome::Suspended);

        let snap = vm.snapshot().await;
        assert_eq!(snap.current_index, 1);
        assert_eq!(snap.current_time, 0.0);
        assert_eq!(snap.duration, 0.0);

        // A late `Ended` from v0 must not skip v1.
        player.with(|s| s.state = EmbedState::Ended);
        assert_eq!(vm.tick().await, TickOutcome::Updated);
        assert_eq!(vm.snapshot().await.current_index, 1);

        // Still at the start of v1, so previous goes back to v0.
        vm.previous().await.unwrap();
        assert_eq!(vm.snapshot().await.current_index, 0);
    }
}
