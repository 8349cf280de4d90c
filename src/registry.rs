use parking_lot::Mutex;
use std::{cmp::Ordering, collections::HashMap, fmt, sync::Arc};

pub type Action = Arc<dyn Fn() + Send + Sync>;

/// How [`CommandRegistry::add`] assigns a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceMode {
    /// Issue a fresh preference above every one issued so far.
    Top,
    /// Reuse the highest issued preference without consuming a new one.
    Current,
    Explicit(i64),
}

impl PreferenceMode {
    /// Numeric form: `0` is [`Top`](Self::Top), `1` is
    /// [`Current`](Self::Current), anything else is explicit.
    pub fn raw(self) -> i64 {
        match self {
            Self::Top => 0,
            Self::Current => 1,
            Self::Explicit(value) => value,
        }
    }
}

impl From<i64> for PreferenceMode {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::Top,
            1 => Self::Current,
            value => Self::Explicit(value),
        }
    }
}

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub action: Action,
    pub preference: i64,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("preference", &self.preference)
            .finish_non_exhaustive()
    }
}

/// Display order: higher preference first, then ascending name.
pub fn ordering(a: &Command, b: &Command) -> Ordering {
    b.preference
        .cmp(&a.preference)
        .then_with(|| a.name.cmp(&b.name))
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, Command>,
    max_preference: i64,
}

/// Thread-safe name to command mapping.
///
/// Every access goes through one lock that is never held while an action
/// runs, so actions may add or remove commands themselves.
#[derive(Default)]
pub struct CommandRegistry {
    state: Mutex<RegistryState>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces `name` and returns its effective preference.
    /// A blank name is ignored and the mode's numeric form is returned.
    pub fn add<F>(&self, name: &str, action: F, mode: impl Into<PreferenceMode>) -> i64
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.add_action(name, Arc::new(action), mode)
    }

    pub fn add_action(&self, name: &str, action: Action, mode: impl Into<PreferenceMode>) -> i64 {
        let mode = mode.into();
        let name = name.trim();
        if name.is_empty() {
            return mode.raw();
        }

        let mut state = self.state.lock();
        let preference = match mode {
            PreferenceMode::Top => {
                state.max_preference += 1;
                state.max_preference
            }
            PreferenceMode::Current => state.max_preference,
            PreferenceMode::Explicit(value) => value,
        };
        state.entries.insert(
            name.to_string(),
            Command {
                name: name.to_string(),
                action,
                preference,
            },
        );
        log::debug!("registered command {name:?} with preference {preference}");
        preference
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.state.lock().entries.remove(name.trim()).is_some();
        if removed {
            log::debug!("removed command {:?}", name.trim());
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().entries.contains_key(name.trim())
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn preference(&self, name: &str) -> Option<i64> {
        self.state
            .lock()
            .entries
            .get(name.trim())
            .map(|command| command.preference)
    }

    /// Highest preference issued through [`PreferenceMode::Top`].
    pub fn max_preference(&self) -> i64 {
        self.state.lock().max_preference
    }

    /// Snapshot of the registered names in display order.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut commands: Vec<Command> = self.state.lock().entries.values().cloned().collect();
        commands.sort_by(ordering);
        commands.into_iter().map(|command| command.name).collect()
    }

    /// Moves `name` above the highest issued preference without consuming a
    /// new one, returning its action. `None` if the command is gone.
    pub fn promote(&self, name: &str) -> Option<Action> {
        let mut state = self.state.lock();
        let preference = state.max_preference + 1;
        let command = state.entries.get_mut(name.trim())?;
        command.preference = preference;
        Some(Arc::clone(&command.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::thread;

    fn noop() {}

    fn command(name: &str, preference: i64) -> Command {
        Command {
            name: name.to_string(),
            action: Arc::new(noop),
            preference,
        }
    }

    #[test]
    fn top_mode_issues_strictly_increasing_preferences() {
        let registry = CommandRegistry::new();
        let issued: Vec<i64> = ["build", "test", "deploy", "build"]
            .iter()
            .map(|name| registry.add(name, noop, 0_i64))
            .collect();

        assert_eq!(issued, vec![1, 2, 3, 4]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn current_mode_reuses_max_without_incrementing() {
        let registry = CommandRegistry::new();
        registry.add("build", noop, PreferenceMode::Top);
        registry.add("test", noop, PreferenceMode::Top);

        assert_eq!(registry.add("exit application", noop, 1_i64), 2);
        assert_eq!(registry.max_preference(), 2);
        assert_eq!(registry.add("deploy", noop, PreferenceMode::Top), 3);
    }

    #[test]
    fn explicit_mode_is_used_verbatim() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.add("pinned", noop, 100_i64), 100);
        assert_eq!(registry.add("sunk", noop, PreferenceMode::Explicit(-5)), -5);
        assert_eq!(registry.max_preference(), 0);
        assert_eq!(registry.preference("pinned"), Some(100));
    }

    #[test]
    fn blank_names_are_ignored() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.add("", noop, PreferenceMode::Top), 0);
        assert_eq!(registry.add("   ", noop, 7_i64), 7);
        assert!(registry.is_empty());
        assert_eq!(registry.max_preference(), 0);
    }

    #[test]
    fn names_are_trimmed() {
        let registry = CommandRegistry::new();
        registry.add("  deploy ", noop, PreferenceMode::Top);
        assert!(registry.contains("deploy"));
        assert!(registry.remove(" deploy"));
    }

    #[test]
    fn remove_missing_is_not_an_error() {
        let registry = CommandRegistry::new();
        registry.add("build", noop, PreferenceMode::Top);
        assert!(registry.remove("build"));
        assert!(!registry.remove("build"));
        assert!(!registry.remove("never"));
    }

    #[test]
    fn ordering_prefers_higher_preference_then_name() {
        let mut commands = vec![command("b", 3), command("a", 3), command("c", 1)];
        commands.sort_by(ordering);
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert_eq!(ordering(&command("a", 1), &command("a", 1)), Ordering::Equal);
        assert_eq!(ordering(&command("a", 1), &command("b", 1)), Ordering::Less);
    }

    #[test]
    fn sorted_names_follow_registration_recency() {
        let registry = CommandRegistry::new();
        registry.add("build", noop, PreferenceMode::Top);
        registry.add("test", noop, PreferenceMode::Top);
        registry.add("deploy", noop, PreferenceMode::Top);
        assert_eq!(registry.sorted_names(), vec!["deploy", "test", "build"]);
    }

    #[test]
    fn promote_jumps_above_max_without_consuming() {
        let registry = CommandRegistry::new();
        registry.add("build", noop, PreferenceMode::Top);
        registry.add("test", noop, PreferenceMode::Top);

        assert!(registry.promote("build").is_some());
        assert_eq!(registry.preference("build"), Some(3));
        assert_eq!(registry.max_preference(), 2);
        assert_eq!(registry.sorted_names(), vec!["build", "test"]);
        assert!(registry.promote("missing").is_none());
    }

    #[test]
    fn promoted_action_is_the_registered_one() {
        let registry = CommandRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry.add(
            "count",
            move || {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
            },
            PreferenceMode::Top,
        );

        let action = registry.promote("count").expect("registered");
        action();
        action();
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn concurrent_adds_never_reuse_preferences() {
        let registry = Arc::new(CommandRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..50)
                        .map(|i| {
                            registry.add(&format!("cmd-{worker}-{i}"), noop, PreferenceMode::Top)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut issued: Vec<i64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("worker panicked"))
            .collect();
        issued.sort_unstable();
        issued.dedup();

        assert_eq!(issued.len(), 400);
        assert_eq!(registry.len(), 400);
        assert_eq!(registry.max_preference(), 400);
    }

    #[test]
    fn concurrent_add_and_remove_keep_mapping_consistent() {
        let registry = Arc::new(CommandRegistry::new());
        let adder = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..200 {
                    registry.add(&format!("job-{i}"), noop, PreferenceMode::Top);
                }
            })
        };
        let remover = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..200 {
                    registry.remove(&format!("job-{i}"));
                }
            })
        };
        adder.join().expect("adder panicked");
        remover.join().expect("remover panicked");

        assert_eq!(registry.max_preference(), 200);
        assert_eq!(registry.sorted_names().len(), registry.len());
    }

    #[test]
    fn lookups_ignore_surrounding_whitespace() {
        let registry = CommandRegistry::new();
        registry.add(" deploy", || {}, PreferenceMode::Explicit(7));

        assert!(registry.contains(" deploy"));
        assert!(registry.contains("deploy"));
        assert_eq!(registry.preference(" deploy "), Some(7));
        assert!(registry.promote("deploy\t").is_some());
        assert_eq!(registry.preference("deploy"), Some(1));
        assert!(registry.remove(" deploy "));
    }
}
