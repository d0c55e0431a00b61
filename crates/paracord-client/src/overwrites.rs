//! Channel overwrite resolution.
//!
//! Only two overwrites are ever consulted: the one targeting the actor, or
//! failing that the one targeting the guild id (the `@everyone` role shares
//! the guild's id). Overwrites for other roles the actor holds are not
//! combined.

use paracord_models::{Overwrite, Permissions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Granted,
    /// Neither an actor nor an `@everyone` overwrite exists.
    NoOverwrite,
    /// First required flag that was denied or not granted.
    Missing(Permissions),
}

impl Resolution {
    pub fn is_granted(self) -> bool {
        matches!(self, Resolution::Granted)
    }
}

/// Actor overwrite first, then the guild's `@everyone` overwrite.
pub fn find_overwrite<'a>(
    overwrites: &'a [Overwrite],
    actor_id: &str,
    guild_id: Option<&str>,
) -> Option<&'a Overwrite> {
    overwrites
        .iter()
        .find(|o| o.target_id == actor_id)
        .or_else(|| {
            let guild_id = guild_id?;
            overwrites.iter().find(|o| o.target_id == guild_id)
        })
}

/// Check `required` flags one at a time, stopping at the first failure.
///
/// A flag passes if the overwrite allows it, fails if it denies it, and
/// otherwise defers to `guild_fallback`. Without a guild id an unset flag
/// fails.
pub fn evaluate<F>(
    overwrites: &[Overwrite],
    actor_id: &str,
    guild_id: Option<&str>,
    required: &[Permissions],
    guild_fallback: F,
) -> Resolution
where
    F: Fn(&str, Permissions) -> bool,
{
    let Some(overwrite) = find_overwrite(overwrites, actor_id, guild_id) else {
        return Resolution::NoOverwrite;
    };

    for &flag in required {
        if overwrite.deny.has(flag) {
            return Resolution::Missing(flag);
        }
        if overwrite.allow.has(flag) {
            continue;
        }
        let granted = guild_id.is_some_and(|gid| guild_fallback(gid, flag));
        if !granted {
            return Resolution::Missing(flag);
        }
    }
    Resolution::Granted
}

pub fn resolve<F>(
    overwrites: &[Overwrite],
    actor_id: &str,
    guild_id: Option<&str>,
    required: &[Permissions],
    guild_fallback: F,
) -> bool
where
    F: Fn(&str, Permissions) -> bool,
{
    evaluate(overwrites, actor_id, guild_id, required, guild_fallback).is_granted()
}
