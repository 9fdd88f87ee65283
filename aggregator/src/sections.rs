/// The character-data categories fetched from the upstream, one endpoint
/// each. `ORDER` is the exact sequence a pipeline requests them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Basic,
    Stat,
    ItemEquipment,
    SetEffect,
    Symbol,
    Jewel,
    AndroidEquipment,
    PetEquipment,
    SkillEquipment,
    LinkSkill,
    Vmatrix,
}

impl Section {
    pub const ORDER: [Section; 11] = [
        Section::Basic,
        Section::Stat,
        Section::ItemEquipment,
        Section::SetEffect,
        Section::Symbol,
        Section::Jewel,
        Section::AndroidEquipment,
        Section::PetEquipment,
        Section::SkillEquipment,
        Section::LinkSkill,
        Section::Vmatrix,
    ];

    /// Key under which the section's payload lands in the merged document.
    pub fn key(self) -> &'static str {
        match self {
            Section::Basic => "basic",
            Section::Stat => "stat",
            Section::ItemEquipment => "item_equipment",
            Section::SetEffect => "set_effect",
            Section::Symbol => "symbol",
            Section::Jewel => "jewel",
            Section::AndroidEquipment => "android_equipment",
            Section::PetEquipment => "pet_equipment",
            Section::SkillEquipment => "skill_equipment",
            Section::LinkSkill => "link_skill",
            Section::Vmatrix => "vmatrix",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Section::Basic => "/maplestorym/v1/character/basic",
            Section::Stat => "/maplestorym/v1/character/stat",
            Section::ItemEquipment => "/maplestorym/v1/character/item-equipment",
            Section::SetEffect => "/maplestorym/v1/character/set-effect",
            Section::Symbol => "/maplestorym/v1/character/symbol",
            Section::Jewel => "/maplestorym/v1/character/jewel",
            Section::AndroidEquipment => "/maplestorym/v1/character/android-equipment",
            Section::PetEquipment => "/maplestorym/v1/character/pet-equipment",
            Section::SkillEquipment => "/maplestorym/v1/character/skill-equipment",
            Section::LinkSkill => "/maplestorym/v1/character/link-skill",
            Section::Vmatrix => "/maplestorym/v1/character/vmatrix",
        }
    }
}
