use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::level_generator::{LevelGenerator, SeededLevelGenerator};
use super::progress::ProgressStore;
use super::scheduler::{Scheduler, TaskId};
use super::settings::Settings;
use super::skill_model::{AdaptiveSkillModel, SkillModel};
use super::store::Store;
use super::timer::Timer;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    GameState, GuessResult, LevelParams, LevelResult, PlayerProfile, PlayerStats, ProfileUpdate,
    Resolution, SessionCommand, SessionEvent, SessionPhase, SkillMetrics,
};

/// Collaborators the session drives but does not own the logic of.
pub struct SessionDeps {
    pub level_generator: Box<dyn LevelGenerator>,
    pub skill_model: Box<dyn SkillModel>,
    pub store: Rc<dyn Store>,
    pub clock: Rc<dyn Clock>,
}

impl SessionDeps {
    /// Production wiring around the given store.
    pub fn standard(store: Rc<dyn Store>) -> Self {
        Self {
            level_generator: Box::new(SeededLevelGenerator),
            skill_model: Box::new(AdaptiveSkillModel),
            store,
            clock: Rc::new(SystemClock),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    Tick,
    CompleteLevel { attempt_id: Uuid },
}

/// A terminal guess waiting out the completion delay.
#[derive(Debug, Clone, Copy)]
struct PendingCompletion {
    task_id: TaskId,
    attempt_id: Uuid,
    won: bool,
    time_used: u64,
}

/// The gameplay state machine.
///
/// All mutation goes through the action methods. Timed work (the clock tick
/// and deferred completions) is queued on an internal scheduler and only runs
/// from [`Session::poll`], so the host decides when time advances.
pub struct Session {
    level_generator: Box<dyn LevelGenerator>,
    skill_model: Box<dyn SkillModel>,
    clock: Rc<dyn Clock>,
    progress: ProgressStore,
    settings: Settings,
    game_state: GameState,
    level_number: u32,
    stats: PlayerStats,
    metrics: SkillMetrics,
    history: Vec<LevelResult>,
    profile: PlayerProfile,
    scheduler: Scheduler<SessionTask>,
    timer: Timer,
    pending: Option<PendingCompletion>,
    event_emitter: EventEmitter<SessionEvent>,
    command_subscription: Option<Unsubscriber<SessionCommand>>,
}

impl Destroyable for Session {
    fn destroy(&mut self) {
        if let Some(subscription) = self.command_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<SessionCommand> for Session {
    fn handle_event(&mut self, command: &SessionCommand) {
        trace!(target: "session", "Handling command: {:?}", command);
        match command {
            SessionCommand::StartNewGame => self.start_new_game(),
            SessionCommand::ContinueGame => self.continue_game(),
            SessionCommand::MakeGuess(guess) => {
                self.make_guess(*guess);
            }
            SessionCommand::PauseGame => self.pause_game(),
            SessionCommand::ResumeGame => self.resume_game(),
            SessionCommand::RestartLevel => self.restart_level(),
            SessionCommand::GoToMainMenu => self.go_to_main_menu(),
            SessionCommand::UpdateProfile(update) => self.update_profile(update.clone()),
            SessionCommand::ResetProgress => self.reset_progress(),
            SessionCommand::Poll => self.poll(),
        }
    }
}

impl Session {
    /// Reads persisted progress and builds an idle-or-ready session. Nothing
    /// runs until an action is taken; a saved attempt is never resumed here.
    pub fn load(
        deps: SessionDeps,
        settings: Settings,
        event_emitter: EventEmitter<SessionEvent>,
    ) -> Self {
        let progress = ProgressStore::new(deps.store);
        let saved = progress.load();
        info!(
            target: "session",
            "Loaded progress: level {}, {} results, phase {}",
            saved.level_number,
            saved.history.len(),
            saved.game_state.phase()
        );
        Self {
            level_generator: deps.level_generator,
            skill_model: deps.skill_model,
            clock: deps.clock,
            progress,
            timer: Timer::new(settings.tick_interval()),
            settings,
            game_state: saved.game_state,
            level_number: saved.level_number,
            stats: saved.stats,
            metrics: saved.metrics,
            history: saved.history,
            profile: saved.profile,
            scheduler: Scheduler::new(),
            pending: None,
            event_emitter,
            command_subscription: None,
        }
    }

    /// Loads a session and routes `SessionCommand`s from `command_observer`
    /// into it. Call [`Destroyable::destroy`] to detach.
    pub fn new_shared(
        deps: SessionDeps,
        settings: Settings,
        event_emitter: EventEmitter<SessionEvent>,
        command_observer: EventObserver<SessionCommand>,
    ) -> Rc<RefCell<Self>> {
        let session = Rc::new(RefCell::new(Self::load(deps, settings, event_emitter)));
        Self::wire_subscription(&session, command_observer);
        session
    }

    fn wire_subscription(
        session: &Rc<RefCell<Self>>,
        command_observer: EventObserver<SessionCommand>,
    ) {
        let subscription = command_observer.subscribe_handler(session);
        session.borrow_mut().command_subscription = Some(subscription);
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn metrics(&self) -> &SkillMetrics {
        &self.metrics
    }

    pub fn history(&self) -> &[LevelResult] {
        &self.history
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.game_state.phase()
    }

    pub fn has_saved_game(&self) -> bool {
        self.game_state.current_level.is_some() && !self.game_state.is_playing
    }

    pub fn has_pending_completion(&self) -> bool {
        self.pending.is_some()
    }

    /// When [`Session::poll`] next has work to do.
    pub fn next_wakeup(&self) -> Option<SystemTime> {
        self.scheduler.next_due()
    }

    pub fn start_new_game(&mut self) {
        self.flush_pending_completion();
        self.set_level_number(1);
        let level = self.generate_level(1, self.seed_for(1));
        info!(target: "session", "Starting new game");
        self.begin_attempt(level);
    }

    pub fn continue_game(&mut self) {
        if self.pending.is_some() {
            self.flush_pending_completion();
        }
        match self.phase() {
            SessionPhase::Idle => self.start_new_game(),
            SessionPhase::Active => {
                debug!(target: "session", "continue_game: already playing");
            }
            SessionPhase::Paused => self.resume_game(),
            SessionPhase::Resolved => self.restart_level(),
            SessionPhase::Ready => {
                // A snapshot saved between the final guess and its recording
                // still owes that result; record it, then continue from there.
                let won = self.game_state.has_correct_guess();
                if won || self.game_state.is_exhausted() {
                    let elapsed = self.game_state.elapsed_time();
                    self.record_completion(won, elapsed);
                    self.continue_game();
                    return;
                }
                let now = self.clock.now();
                self.game_state.timer = self.game_state.timer.resumed(now);
                self.game_state.is_playing = true;
                self.game_state.is_paused = false;
                self.timer.start(&mut self.scheduler, now, SessionTask::Tick);
                info!(
                    target: "session",
                    "Continuing level {} at {}s",
                    self.level_number,
                    self.game_state.elapsed_time()
                );
                self.state_changed();
            }
        }
    }

    /// Evaluates a guess against the current target. Refused guesses return
    /// a placeholder result and change nothing.
    pub fn make_guess(&mut self, guess: i64) -> GuessResult {
        let now = self.clock.now();
        let timestamp = DateTime::<Utc>::from(now);

        let accepting = self.phase().accepts_guesses()
            && self.pending.is_none()
            && !self.game_state.is_exhausted();
        let level = match self.game_state.current_level.clone() {
            Some(level) if accepting => level,
            _ => {
                debug!(
                    target: "session",
                    "Ignoring guess {} in phase {}",
                    guess,
                    self.phase()
                );
                return GuessResult::placeholder(guess, timestamp);
            }
        };

        self.game_state.timer = self.game_state.timer.ticked(now);
        if self.time_limit_reached(&level) {
            self.expire_time_limit(&level);
            return GuessResult::placeholder(guess, timestamp);
        }

        let result = if guess == level.target_number {
            GuessResult::correct(guess, timestamp)
        } else {
            let attempts_remaining = level
                .max_attempts
                .saturating_sub(self.game_state.attempts_used() + 1);
            let hint = self.skill_model.get_hint(
                guess,
                level.target_number,
                level.hint_style,
                attempts_remaining,
            );
            GuessResult::new(guess, hint.feedback, hint.hint, hint.penalty, timestamp)
        };
        self.game_state.current_guesses.push(result.clone());
        debug!(
            target: "session",
            "Guess {} -> {} ({}/{})",
            guess,
            result.feedback.as_str(),
            self.game_state.attempts_used(),
            level.max_attempts
        );

        let elapsed = self.game_state.elapsed_time();
        if result.is_correct() {
            self.schedule_completion(true, elapsed, now);
        } else if self.game_state.is_exhausted() {
            self.schedule_completion(false, elapsed, now);
        }

        self.event_emitter
            .emit(SessionEvent::GuessEvaluated(result.clone()));
        self.state_changed();
        result
    }

    /// Records the current attempt. Only the first call per attempt counts.
    pub fn complete_level(&mut self, won: bool) {
        if !self.game_state.is_playing || self.game_state.resolution.is_some() {
            debug!(target: "session", "complete_level: no attempt in progress");
            return;
        }
        let time_used = match self.pending.take() {
            Some(pending) => {
                self.scheduler.cancel(pending.task_id);
                pending.time_used
            }
            None => self.game_state.timer.elapsed_at(self.clock.now()),
        };
        self.record_completion(won, time_used);
    }

    pub fn pause_game(&mut self) {
        if self.phase() != SessionPhase::Active {
            debug!(target: "session", "pause_game: not active");
            return;
        }
        let now = self.clock.now();
        self.timer.stop(&mut self.scheduler);
        self.game_state.timer = self.game_state.timer.stopped(now);
        self.game_state.is_paused = true;
        debug!(target: "session", "Paused at {}s", self.game_state.elapsed_time());
        self.state_changed();
    }

    pub fn resume_game(&mut self) {
        if self.phase() != SessionPhase::Paused {
            debug!(target: "session", "resume_game: not paused");
            return;
        }
        let now = self.clock.now();
        self.game_state.timer = self.game_state.timer.resumed(now);
        self.game_state.is_paused = false;
        self.timer.start(&mut self.scheduler, now, SessionTask::Tick);
        debug!(target: "session", "Resumed at {}s", self.game_state.elapsed_time());
        self.state_changed();
    }

    /// Replays the current level number with the next seed.
    pub fn restart_level(&mut self) {
        self.flush_pending_completion();
        let Some(seed) = self.game_state.current_level.as_ref().map(|level| level.seed) else {
            self.start_new_game();
            return;
        };
        let level = self.generate_level(self.level_number, seed.wrapping_add(1));
        info!(target: "session", "Restarting level {}", self.level_number);
        self.begin_attempt(level);
    }

    /// Leaves the attempt where it is; `continue_game` picks it up again.
    pub fn go_to_main_menu(&mut self) {
        self.flush_pending_completion();
        let now = self.clock.now();
        self.timer.stop(&mut self.scheduler);
        self.game_state.timer = self.game_state.timer.stopped(now);
        self.game_state.is_playing = false;
        self.game_state.is_paused = false;
        debug!(target: "session", "Back to main menu");
        self.state_changed();
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        self.profile = self.profile.updated(update);
        self.progress.save_profile(&self.profile);
        self.event_emitter
            .emit(SessionEvent::ProfileChanged(self.profile.clone()));
    }

    /// Wipes every persisted key and returns to a first-launch state.
    pub fn reset_progress(&mut self) {
        self.scheduler.clear();
        self.timer.reset();
        self.pending = None;
        self.progress.clear_all();

        self.stats = self.skill_model.create_initial_stats();
        self.metrics = SkillMetrics::default();
        self.history.clear();
        self.profile = PlayerProfile::default();
        self.level_number = 1;
        self.game_state = GameState::default();
        info!(target: "session", "Progress reset");

        self.event_emitter.emit(SessionEvent::ProgressReset);
        self.event_emitter
            .emit(SessionEvent::LevelNumberChanged(self.level_number));
        self.emit_stats();
        self.event_emitter
            .emit(SessionEvent::ProfileChanged(self.profile.clone()));
        self.event_emitter
            .emit(SessionEvent::GameStateChanged(self.game_state.clone()));
    }

    /// Runs every task due by now, earliest first.
    pub fn poll(&mut self) {
        loop {
            let now = self.clock.now();
            let Some((task_id, task)) = self.scheduler.take_due(now) else {
                break;
            };
            match task {
                SessionTask::Tick => self.on_tick(task_id, now),
                SessionTask::CompleteLevel { attempt_id } => {
                    self.on_completion_due(task_id, attempt_id)
                }
            }
        }
    }

    fn on_tick(&mut self, task_id: TaskId, now: SystemTime) {
        if !self
            .timer
            .on_tick(task_id, &mut self.scheduler, now, SessionTask::Tick)
        {
            return;
        }
        if self.phase() != SessionPhase::Active {
            self.timer.stop(&mut self.scheduler);
            return;
        }

        let previous = self.game_state.elapsed_time();
        self.game_state.timer = self.game_state.timer.ticked(now);
        let elapsed = self.game_state.elapsed_time();
        if elapsed != previous {
            self.event_emitter
                .emit(SessionEvent::ElapsedTimeChanged(elapsed));
        }

        if let Some(level) = self.game_state.current_level.clone() {
            if self.pending.is_none() && self.time_limit_reached(&level) {
                self.expire_time_limit(&level);
                return;
            }
        }
        self.progress.save_game_state(&self.game_state);
    }

    fn on_completion_due(&mut self, task_id: TaskId, attempt_id: Uuid) {
        match self.pending {
            Some(pending) if pending.task_id == task_id && pending.attempt_id == attempt_id => {
                self.pending = None;
                self.record_completion(pending.won, pending.time_used);
            }
            _ => trace!(target: "session", "Ignoring stale completion for {}", attempt_id),
        }
    }

    fn time_limit_reached(&self, level: &LevelParams) -> bool {
        level
            .time_limit
            .is_some_and(|limit| self.game_state.elapsed_time() >= u64::from(limit))
    }

    fn expire_time_limit(&mut self, level: &LevelParams) {
        let limit = level.time_limit.map_or(u64::MAX, u64::from);
        info!(target: "session", "Time limit of {}s reached", limit);
        self.record_completion(false, self.game_state.elapsed_time().min(limit));
    }

    fn schedule_completion(&mut self, won: bool, time_used: u64, now: SystemTime) {
        let attempt_id = self.game_state.attempt_id;
        let task_id = self.scheduler.schedule(
            now + self.settings.completion_delay(),
            SessionTask::CompleteLevel { attempt_id },
        );
        self.pending = Some(PendingCompletion {
            task_id,
            attempt_id,
            won,
            time_used,
        });
    }

    /// Records a pending completion right away instead of dropping it.
    fn flush_pending_completion(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.scheduler.cancel(pending.task_id);
        if pending.attempt_id == self.game_state.attempt_id {
            self.record_completion(pending.won, pending.time_used);
        }
    }

    fn record_completion(&mut self, won: bool, time_used: u64) {
        let Some(level) = self.game_state.current_level.clone() else {
            return;
        };
        let now = self.clock.now();
        self.timer.stop(&mut self.scheduler);
        self.game_state.timer = self.game_state.timer.stopped(now);
        self.game_state.is_playing = false;
        self.game_state.is_paused = false;

        let accuracy = if won {
            self.skill_model.calculate_level_accuracy(
                self.game_state.attempts_used(),
                level.max_attempts,
                level.range_size(),
            )
        } else {
            0.0
        };
        let result = LevelResult::from_attempt(
            self.level_number,
            &level,
            &self.game_state,
            won,
            time_used,
            accuracy,
            DateTime::<Utc>::from(now),
        );
        info!(
            target: "session",
            "Level {} {} in {} attempts, {}s",
            self.level_number,
            if won { "won" } else { "lost" },
            result.attempts_used,
            result.time_used
        );

        self.history.push(result.clone());
        self.stats = self.skill_model.update_stats_with_result(&self.stats, &result);
        self.metrics = self
            .skill_model
            .calculate_skill_metrics(&self.stats, &self.history);
        self.progress.save_history(&self.history);
        self.progress.save_stats(&self.stats);
        self.progress.save_metrics(&self.metrics);
        self.event_emitter.emit(SessionEvent::LevelCompleted(result));
        self.emit_stats();

        if won {
            let next_number = self.level_number.saturating_add(1);
            self.set_level_number(next_number);
            let next = self.generate_level(next_number, self.seed_for(next_number));
            self.game_state = GameState::ready(next);
        } else {
            self.game_state.resolution = Some(Resolution::Lost);
        }
        self.state_changed();
    }

    fn begin_attempt(&mut self, level: LevelParams) {
        let now = self.clock.now();
        self.game_state = GameState::started(level, now);
        self.timer.start(&mut self.scheduler, now, SessionTask::Tick);
        self.state_changed();
    }

    /// The configured seed offset by level number, or a fresh random one.
    fn seed_for(&self, level_number: u32) -> u64 {
        match self.settings.seed {
            Some(seed) => seed.wrapping_add(u64::from(level_number)),
            None => rand::random(),
        }
    }

    fn generate_level(&self, level_number: u32, seed: u64) -> LevelParams {
        self.level_generator
            .generate_level(level_number, &self.metrics, Some(seed))
    }

    fn set_level_number(&mut self, level_number: u32) {
        self.level_number = level_number;
        self.progress.save_level_number(level_number);
        self.event_emitter
            .emit(SessionEvent::LevelNumberChanged(level_number));
    }

    fn emit_stats(&self) {
        self.event_emitter.emit(SessionEvent::StatsChanged {
            stats: self.stats.clone(),
            metrics: self.metrics.clone(),
        });
    }

    fn state_changed(&self) {
        self.progress.save_game_state(&self.game_state);
        self.event_emitter
            .emit(SessionEvent::GameStateChanged(self.game_state.clone()));
    }
}
