//! Signal handles and the connection-provider interface.
//!
//! A `Signal` is a cheap, cloneable handle onto the live level of one
//! physical connection. Every clone observes the same level, so a register
//! bound to a signal sees pad changes immediately.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handle onto the current level of a named physical connection.
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
    index: usize,
    level: Arc<AtomicBool>,
}

impl Signal {
    /// Create a new signal, initially low.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connection name this signal was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance index of the connection.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current level of the pad.
    pub fn level(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Drive the pad to `level`. All clones observe the change.
    pub fn set(&self, level: bool) {
        self.level.store(level, Ordering::Release);
    }

    /// Whether both handles observe the same pad.
    pub fn same_pad(&self, other: &Signal) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.index)
    }
}

/// A connection lookup that named no declared connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown connection: {name}:{index}")]
pub struct UnknownConnection {
    /// Requested connection name.
    pub name: String,
    /// Requested instance index.
    pub index: usize,
}

impl UnknownConnection {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Anything that can resolve a connection name and instance index to a
/// live signal handle.
pub trait ConnectionProvider {
    /// Resolve `name` at instance `index`.
    fn resolve(&self, name: &str, index: usize) -> Result<Signal, UnknownConnection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn resolve(&self, name: &str, index: usize) -> Result<Signal, UnknownConnection> {
        (**self).resolve(name, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_signal_is_low() {
        let sig = Signal::new("button_UP", 0);
        assert_eq!(sig.name(), "button_UP");
        assert_eq!(sig.index(), 0);
        assert!(!sig.level());
    }

    #[test]
    fn clones_share_level() {
        let a = Signal::new("button_UP", 0);
        let b = a.clone();
        a.set(true);
        assert!(b.level());
        b.set(false);
        assert!(!a.level());
        assert!(a.same_pad(&b));
    }

    #[test]
    fn distinct_signals_do_not_share() {
        let a = Signal::new("x", 0);
        let b = Signal::new("x", 0);
        assert!(!a.same_pad(&b));
    }

    #[test]
    fn display_names_connection() {
        assert_eq!(Signal::new("user_led", 3).to_string(), "user_led:3");
        assert_eq!(
            UnknownConnection::new("button_UP", 1).to_string(),
            "unknown connection: button_UP:1"
        );
    }
}
