use std::collections::BTreeMap;

use super::model::{AbilityType, BuffKey};
use crate::settings::ReportSettings;

lazy_static::lazy_static! {
    static ref DEFAULT_BUFF_KEYS: BuffKeyTable =
        BuffKeyTable::from_settings(&ReportSettings::default());
}

pub fn ability_type_from_code(code: i64) -> AbilityType {
    match code {
        0 => AbilityType::None,
        1 => AbilityType::Physical,
        4 => AbilityType::Fire,
        16 => AbilityType::Frost,
        32 => AbilityType::Shadow,
        other => AbilityType::Unknown(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuffKeyTable {
    keys: BTreeMap<u32, BuffKey>,
}

impl BuffKeyTable {
    pub fn from_settings(settings: &ReportSettings) -> Self {
        let mut keys = BTreeMap::new();
        let groups = [
            (BuffKey::Presence, &settings.presence_buff_ids),
            (BuffKey::KillingMachine, &settings.killing_machine_buff_ids),
            (BuffKey::Rime, &settings.rime_buff_ids),
        ];

        for (key, ability_ids) in groups {
            for ability_id in ability_ids {
                keys.insert(*ability_id, key);
            }
        }

        Self { keys }
    }

    pub fn resolve(&self, ability_id: u32) -> BuffKey {
        self.keys.get(&ability_id).copied().unwrap_or(BuffKey::Other)
    }
}

impl Default for BuffKeyTable {
    fn default() -> Self {
        DEFAULT_BUFF_KEYS.clone()
    }
}
