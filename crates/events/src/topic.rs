/// Webhook topic as announced by the platform.
///
/// The platform spells topics two ways depending on the channel
/// (`inventory_levels/update` in headers, `INVENTORY_LEVELS_UPDATE` in the
/// GraphQL enum); both parse to the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    InventoryLevelsUpdate,
    Other(String),
}

impl Topic {
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_ascii_lowercase().replace('/', "_");
        match key.as_str() {
            "inventory_levels_update" => Topic::InventoryLevelsUpdate,
            _ => Topic::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Topic::InventoryLevelsUpdate => "inventory_levels/update",
            Topic::Other(s) => s,
        }
    }
}

impl core::fmt::Display for Topic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
