use dashmap::DashMap;
use paracord_models::Permissions;

/// Guild-wide permission check, consulted when a channel overwrite neither
/// allows nor denies a flag, and as the only check for guild-level gates.
pub trait GuildPermissionOracle: Send + Sync {
    /// True if the client holds every flag in `flags` in `guild_id`.
    fn check(&self, guild_id: &str, flags: Permissions) -> bool;
}

impl<F> GuildPermissionOracle for F
where
    F: Fn(&str, Permissions) -> bool + Send + Sync,
{
    fn check(&self, guild_id: &str, flags: Permissions) -> bool {
        self(guild_id, flags)
    }
}

/// Compute the client's base permissions in a guild from its roles.
pub fn compute_base_permissions(role_permissions: &[Permissions], is_owner: bool) -> Permissions {
    if is_owner {
        return Permissions::all();
    }

    let perms = Permissions::encode(role_permissions);
    if perms.contains(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    perms
}

/// Oracle backed by an in-memory guild -> base permissions table, filled
/// from guild/member payloads by the owner of the client.
#[derive(Debug, Default)]
pub struct GuildPermissionTable {
    guilds: DashMap<String, Permissions>,
}

impl GuildPermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, guild_id: impl Into<String>, permissions: Permissions) {
        self.guilds.insert(guild_id.into(), permissions);
    }

    pub fn set_from_roles(
        &self,
        guild_id: impl Into<String>,
        role_permissions: &[Permissions],
        is_owner: bool,
    ) {
        self.set(guild_id, compute_base_permissions(role_permissions, is_owner));
    }

    pub fn get(&self, guild_id: &str) -> Option<Permissions> {
        self.guilds.get(guild_id).map(|entry| *entry.value())
    }

    /// Drop a guild (called when the client leaves it).
    pub fn remove(&self, guild_id: &str) {
        self.guilds.remove(guild_id);
    }

    pub fn clear(&self) {
        self.guilds.clear();
    }
}

impl GuildPermissionOracle for GuildPermissionTable {
    fn check(&self, guild_id: &str, flags: Permissions) -> bool {
        self.get(guild_id)
            .is_some_and(|perms| perms.contains(Permissions::ADMINISTRATOR) || perms.contains(flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_gets_everything() {
        assert_eq!(compute_base_permissions(&[], true), Permissions::all());
    }

    #[test]
    fn administrator_role_gets_everything() {
        let perms = compute_base_permissions(
            &[Permissions::VIEW_CHANNEL, Permissions::ADMINISTRATOR],
            false,
        );
        assert_eq!(perms, Permissions::all());
    }

    #[test]
    fn roles_are_combined() {
        let perms = compute_base_permissions(
            &[Permissions::VIEW_CHANNEL, Permissions::SEND_MESSAGES],
            false,
        );
        assert!(perms.contains(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES));
        assert!(!perms.contains(Permissions::MANAGE_MESSAGES));
    }

    #[test]
    fn table_checks_all_flags() {
        let table = GuildPermissionTable::new();
        table.set("1", Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES);
        assert!(table.check("1", Permissions::VIEW_CHANNEL));
        assert!(table.check("1", Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES));
        assert!(!table.check("1", Permissions::VIEW_CHANNEL | Permissions::MANAGE_WEBHOOKS));
        assert!(!table.check("2", Permissions::VIEW_CHANNEL));
    }

    #[test]
    fn removed_guild_denies() {
        let table = GuildPermissionTable::new();
        table.set_from_roles("1", &[], true);
        assert!(table.check("1", Permissions::MANAGE_CHANNELS));
        table.remove("1");
        assert!(!table.check("1", Permissions::MANAGE_CHANNELS));
    }
}
