//! Static game data: races, buildings, units and the rule constants
//!
//! Every table here is read-only and keyed by a closed enum, so lookups are
//! total functions. An unknown key cannot reach this module: it is rejected
//! when the wire message is deserialized.

use serde::{Deserialize, Serialize};

/// Gold every player starts a match with
pub const STARTING_GOLD: u32 = 500;
/// Gold per second before economy buildings
pub const BASE_INCOME: u32 = 10;
/// Castle health at match start
pub const CASTLE_MAX_HEALTH: i32 = 1000;
/// Default building phase length (seconds)
pub const BUILDING_PHASE_SECS: u32 = 120;
/// Lane movement speed shared by every unit (units per second)
pub const UNIT_MOVE_SPEED: f32 = 2.0;
/// Seconds between two attacks of the same unit
pub const ATTACK_COOLDOWN: f32 = 1.0;
/// Minimum distance between any two buildings in a match
pub const MIN_BUILDING_SPACING: f32 = 1.5;
/// Buildable half-width of the board on each side of x = 0
pub const BUILD_ZONE_HALF_WIDTH: f32 = 12.0;
/// Castles sit at x = ±CASTLE_X on the lane centerline
pub const CASTLE_X: f32 = 12.0;
pub const CASTLE_Y: f32 = 1.0;
/// Fixed height of buildings and units on the ground plane
pub const GROUND_Y: f32 = 0.5;
/// Units closer than this to the lane centerline stop re-centering
pub const LANE_CENTER_TOLERANCE: f32 = 0.1;

pub const BOARD_WIDTH: f32 = 30.0;
pub const BOARD_HEIGHT: f32 = 20.0;
pub const LANE_WIDTH: f32 = 4.0;

/// Playable races
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Undead,
    Nature,
    Fire,
}

impl Race {
    pub const ALL: [Race; 4] = [Race::Human, Race::Undead, Race::Nature, Race::Fire];
}

/// Unit combat category, drives attack ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Melee,
    Ranged,
    Siege,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCategory {
    Combat,
    Economy,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    HumanSwordsman,
    HumanKnight,
    HumanArcher,
    HumanCrossbowman,
    HumanPaladin,
    HumanCleric,
    HumanPriest,
    HumanCatapult,
    UndeadZombie,
    UndeadGhoul,
    UndeadSkeleton,
    UndeadArcher,
    UndeadNecromancer,
    UndeadAbomination,
    UndeadDragon,
    NatureTreant,
    NatureDryad,
    NatureWolf,
    NatureBear,
    NatureWaterElemental,
    NatureNymph,
    NatureWasp,
    NatureSpider,
    NatureEagle,
    FireElemental,
    FireImp,
    FireMage,
    FireWarlock,
    FirePhoenix,
    FireGolem,
    FireCannonBall,
}

impl UnitType {
    pub const ALL: [UnitType; 31] = [
        UnitType::HumanSwordsman,
        UnitType::HumanKnight,
        UnitType::HumanArcher,
        UnitType::HumanCrossbowman,
        UnitType::HumanPaladin,
        UnitType::HumanCleric,
        UnitType::HumanPriest,
        UnitType::HumanCatapult,
        UnitType::UndeadZombie,
        UnitType::UndeadGhoul,
        UnitType::UndeadSkeleton,
        UnitType::UndeadArcher,
        UnitType::UndeadNecromancer,
        UnitType::UndeadAbomination,
        UnitType::UndeadDragon,
        UnitType::NatureTreant,
        UnitType::NatureDryad,
        UnitType::NatureWolf,
        UnitType::NatureBear,
        UnitType::NatureWaterElemental,
        UnitType::NatureNymph,
        UnitType::NatureWasp,
        UnitType::NatureSpider,
        UnitType::NatureEagle,
        UnitType::FireElemental,
        UnitType::FireImp,
        UnitType::FireMage,
        UnitType::FireWarlock,
        UnitType::FirePhoenix,
        UnitType::FireGolem,
        UnitType::FireCannonBall,
    ];

    pub fn category(self) -> UnitCategory {
        UnitData::for_type(self).category
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    HumanBarracks,
    HumanArchery,
    HumanStable,
    HumanChurch,
    HumanWorkshop,
    HumanMarket,
    UndeadCrypt,
    UndeadGraveyard,
    UndeadAltar,
    UndeadLaboratory,
    UndeadBoneyard,
    UndeadMine,
    NatureGrove,
    NatureDen,
    NaturePond,
    NatureHive,
    NatureAviary,
    NatureFarm,
    FireForge,
    FireAltar,
    FirePyre,
    FireFoundry,
    FireCannon,
    FireMine,
}

impl BuildingType {
    pub const ALL: [BuildingType; 24] = [
        BuildingType::HumanBarracks,
        BuildingType::HumanArchery,
        BuildingType::HumanStable,
        BuildingType::HumanChurch,
        BuildingType::HumanWorkshop,
        BuildingType::HumanMarket,
        BuildingType::UndeadCrypt,
        BuildingType::UndeadGraveyard,
        BuildingType::UndeadAltar,
        BuildingType::UndeadLaboratory,
        BuildingType::UndeadBoneyard,
        BuildingType::UndeadMine,
        BuildingType::NatureGrove,
        BuildingType::NatureDen,
        BuildingType::NaturePond,
        BuildingType::NatureHive,
        BuildingType::NatureAviary,
        BuildingType::NatureFarm,
        BuildingType::FireForge,
        BuildingType::FireAltar,
        BuildingType::FirePyre,
        BuildingType::FireFoundry,
        BuildingType::FireCannon,
        BuildingType::FireMine,
    ];

    pub fn race(self) -> Race {
        BuildingData::for_type(self).race
    }

    /// Buildings a player of `race` may place
    pub fn for_race(race: Race) -> impl Iterator<Item = BuildingType> {
        Self::ALL.into_iter().filter(move |b| b.race() == race)
    }
}

/// Unit stats
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    pub name: &'static str,
    pub description: &'static str,
    pub category: UnitCategory,
    pub race: Race,
    pub health: i32,
    pub damage: i32,
    /// Catalog speed (display only, movement uses UNIT_MOVE_SPEED)
    pub speed: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<&'static str>,
}

impl UnitData {
    pub fn for_type(unit_type: UnitType) -> Self {
        use UnitCategory::*;
        use UnitType::*;

        let (name, description, category, race, health, damage, speed, special) = match unit_type {
            HumanSwordsman => ("Swordsman", "Basic infantry unit with balanced stats.", Melee, Race::Human, 100, 12, 2.0, None),
            HumanKnight => ("Knight", "Heavy cavalry unit with high health and damage.", Melee, Race::Human, 180, 18, 3.0, None),
            HumanArcher => ("Archer", "Basic ranged unit that attacks from a distance.", Ranged, Race::Human, 60, 15, 2.0, None),
            HumanCrossbowman => ("Crossbowman", "Advanced ranged unit with higher damage.", Ranged, Race::Human, 80, 20, 1.5, None),
            HumanPaladin => ("Paladin", "Elite holy warrior with high health and damage.", Melee, Race::Human, 250, 25, 2.0, Some("Holy aura heals nearby friendly units")),
            HumanCleric => ("Cleric", "Support unit that heals nearby allies.", Ranged, Race::Human, 70, 5, 1.5, Some("Heals nearby friendly units")),
            HumanPriest => ("Priest", "Advanced support unit with stronger healing and damage.", Ranged, Race::Human, 90, 10, 1.5, Some("Stronger healing and can damage undead units")),
            HumanCatapult => ("Catapult", "Siege weapon that deals area damage from a distance.", Siege, Race::Human, 120, 50, 1.0, Some("Area of effect damage")),

            UndeadZombie => ("Zombie", "Basic undead unit with low stats but cheap to produce.", Melee, Race::Undead, 80, 8, 1.5, None),
            UndeadGhoul => ("Ghoul", "Fast melee attacker that can frenzy.", Melee, Race::Undead, 100, 15, 2.5, Some("Frenzies after kills, increasing attack speed")),
            UndeadSkeleton => ("Skeleton Warrior", "Basic undead warrior with balanced stats.", Melee, Race::Undead, 70, 12, 2.0, None),
            UndeadArcher => ("Skeleton Archer", "Basic ranged undead unit.", Ranged, Race::Undead, 50, 14, 2.0, None),
            UndeadNecromancer => ("Necromancer", "Powerful ranged caster that can raise dead.", Ranged, Race::Undead, 100, 18, 1.5, Some("Can summon skeleton warriors from fallen units")),
            UndeadAbomination => ("Abomination", "Large undead monstrosity with high health.", Melee, Race::Undead, 300, 30, 1.0, Some("Deals poison damage over time")),
            UndeadDragon => ("Bone Dragon", "Flying undead dragon with high damage.", Flying, Race::Undead, 200, 40, 3.0, Some("Can attack ground and air units")),

            NatureTreant => ("Treant", "Living tree with high health but slow movement.", Melee, Race::Nature, 250, 20, 1.0, Some("Regenerates health over time")),
            NatureDryad => ("Dryad", "Forest spirit that heals allies and damages enemies.", Ranged, Race::Nature, 80, 12, 2.0, Some("Heals nearby nature units")),
            NatureWolf => ("Dire Wolf", "Fast melee attacker that hunts in packs.", Melee, Race::Nature, 90, 15, 3.0, Some("Bonus damage when near other wolves")),
            NatureBear => ("Guardian Bear", "Powerful melee unit with high health and damage.", Melee, Race::Nature, 220, 25, 2.0, None),
            NatureWaterElemental => ("Water Elemental", "Magical being made of water that slows enemies.", Ranged, Race::Nature, 150, 18, 2.0, Some("Slows enemy movement")),
            NatureNymph => ("Forest Nymph", "Agile ranged attacker that enhances nearby allies.", Ranged, Race::Nature, 70, 10, 2.5, Some("Increases nearby allies' attack speed")),
            NatureWasp => ("Giant Wasp", "Flying insect that poisons enemies.", Flying, Race::Nature, 60, 12, 3.5, Some("Poisons enemies, dealing damage over time")),
            NatureSpider => ("Giant Spider", "Fast melee attacker that can web enemies.", Melee, Race::Nature, 100, 14, 2.5, Some("Can immobilize enemies temporarily")),
            NatureEagle => ("Giant Eagle", "Flying unit with high speed and decent damage.", Flying, Race::Nature, 120, 22, 4.0, None),

            FireElemental => ("Fire Elemental", "Basic fire unit that burns enemies.", Melee, Race::Fire, 110, 18, 2.0, Some("Burns enemies, dealing damage over time")),
            FireImp => ("Fire Imp", "Small, fast fire creature with ranged attacks.", Ranged, Race::Fire, 50, 15, 3.0, None),
            FireMage => ("Fire Mage", "Caster that launches powerful fireballs.", Ranged, Race::Fire, 80, 25, 1.5, Some("Area of effect damage")),
            FireWarlock => ("Warlock", "Powerful caster with devastating fire spells.", Ranged, Race::Fire, 100, 35, 1.5, Some("Can cast a powerful fire nova")),
            FirePhoenix => ("Phoenix", "Majestic fire bird that can resurrect once.", Flying, Race::Fire, 150, 30, 3.5, Some("Resurrects once with half health when killed")),
            FireGolem => ("Fire Golem", "Massive fire construct with very high health and damage.", Melee, Race::Fire, 400, 50, 1.0, Some("Deals splash damage to nearby enemies")),
            FireCannonBall => ("Cannon Ball", "Explosive projectile that deals area damage.", Siege, Race::Fire, 30, 60, 2.5, Some("Large area of effect damage")),
        };

        Self {
            name,
            description,
            category,
            race,
            health,
            damage,
            speed,
            special,
        }
    }
}

/// Building stats
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingData {
    pub name: &'static str,
    pub description: &'static str,
    pub category: BuildingCategory,
    pub race: Race,
    pub cost: u32,
    /// Seconds between two spawns (0 for buildings that produce nothing)
    pub cooldown: f32,
    pub health: i32,
    pub produces: &'static [UnitType],
    /// Extra gold per second while owned
    pub income_bonus: u32,
}

impl BuildingData {
    pub fn for_type(building_type: BuildingType) -> Self {
        use BuildingCategory::*;
        use BuildingType::*;
        use UnitType as U;

        let (name, description, category, race, cost, cooldown, health, produces, income_bonus): (
            &'static str,
            &'static str,
            BuildingCategory,
            Race,
            u32,
            f32,
            i32,
            &'static [UnitType],
            u32,
        ) = match building_type {
            HumanBarracks => ("Barracks", "Trains human soldiers to defend your castle.", Combat, Race::Human, 150, 10.0, 300, &[U::HumanSwordsman, U::HumanKnight], 0),
            HumanArchery => ("Archery Range", "Trains skilled archers that attack from a distance.", Combat, Race::Human, 200, 15.0, 250, &[U::HumanArcher, U::HumanCrossbowman], 0),
            HumanStable => ("Stables", "Trains mounted knights that move quickly across the battlefield.", Combat, Race::Human, 250, 20.0, 280, &[U::HumanKnight, U::HumanPaladin], 0),
            HumanChurch => ("Church", "Trains clerics that can heal nearby units.", Special, Race::Human, 300, 25.0, 350, &[U::HumanCleric, U::HumanPriest], 0),
            HumanWorkshop => ("Workshop", "Builds siege weapons that can attack from a great distance.", Combat, Race::Human, 350, 30.0, 300, &[U::HumanCatapult], 0),
            HumanMarket => ("Market", "Generates additional gold over time.", Economy, Race::Human, 180, 0.0, 200, &[], 5),

            UndeadCrypt => ("Crypt", "Raises zombies and ghouls to attack enemies.", Combat, Race::Undead, 120, 8.0, 220, &[U::UndeadZombie, U::UndeadGhoul], 0),
            UndeadGraveyard => ("Graveyard", "Summons skeletal archers and warriors.", Combat, Race::Undead, 180, 12.0, 200, &[U::UndeadSkeleton, U::UndeadArcher], 0),
            UndeadAltar => ("Dark Altar", "Creates powerful necromancers that can raise the dead.", Special, Race::Undead, 320, 25.0, 280, &[U::UndeadNecromancer], 0),
            UndeadLaboratory => ("Laboratory", "Creates plague-spreading abominations.", Combat, Race::Undead, 280, 18.0, 250, &[U::UndeadAbomination], 0),
            UndeadBoneyard => ("Boneyard", "Raises skeletal dragons that dominate the skies.", Combat, Race::Undead, 400, 35.0, 300, &[U::UndeadDragon], 0),
            UndeadMine => ("Haunted Mine", "Undead miners generate gold from beyond the grave.", Economy, Race::Undead, 200, 0.0, 180, &[], 6),

            NatureGrove => ("Ancient Grove", "Grows treants and dryads to protect the forest.", Combat, Race::Nature, 130, 12.0, 250, &[U::NatureTreant, U::NatureDryad], 0),
            NatureDen => ("Beast Den", "Raises wild animals that fight with tooth and claw.", Combat, Race::Nature, 160, 14.0, 230, &[U::NatureWolf, U::NatureBear], 0),
            NaturePond => ("Mystical Pond", "Spawns water elementals and nymphs.", Special, Race::Nature, 220, 20.0, 200, &[U::NatureWaterElemental, U::NatureNymph], 0),
            NatureHive => ("Giant Hive", "Home to giant insects that swarm enemies.", Combat, Race::Nature, 200, 10.0, 180, &[U::NatureWasp, U::NatureSpider], 0),
            NatureAviary => ("Aviary", "Houses giant birds that attack from above.", Combat, Race::Nature, 300, 25.0, 220, &[U::NatureEagle], 0),
            NatureFarm => ("Ancient Farm", "Grows magical crops that generate gold.", Economy, Race::Nature, 150, 0.0, 150, &[], 8),

            FireForge => ("Infernal Forge", "Creates fire elementals that burn everything in their path.", Combat, Race::Fire, 200, 15.0, 220, &[U::FireElemental, U::FireImp], 0),
            FireAltar => ("Flame Altar", "Summons powerful fire mages.", Combat, Race::Fire, 250, 18.0, 200, &[U::FireMage, U::FireWarlock], 0),
            FirePyre => ("Phoenix Pyre", "Hatches phoenixes that dominate the skies.", Combat, Race::Fire, 350, 30.0, 180, &[U::FirePhoenix], 0),
            FireFoundry => ("Demon Foundry", "Forges fire golems that are slow but extremely powerful.", Special, Race::Fire, 400, 35.0, 280, &[U::FireGolem], 0),
            FireCannon => ("Flame Cannon", "Launches fireballs that damage multiple enemies.", Combat, Race::Fire, 300, 20.0, 220, &[U::FireCannonBall], 0),
            FireMine => ("Magma Mine", "Extracts gold from the depths of volcanic chambers.", Economy, Race::Fire, 220, 0.0, 180, &[], 7),
        };

        Self {
            name,
            description,
            category,
            race,
            cost,
            cooldown,
            health,
            produces,
            income_bonus,
        }
    }
}

/// Descriptive race sheet shown on the race selection screen
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RaceData {
    pub description: &'static str,
    pub specialty: &'static str,
    pub offense: &'static str,
    pub defense: &'static str,
    pub economy: &'static str,
    pub modifiers: RaceModifiers,
}

/// Per-race stat multipliers.
///
/// Published with the catalog but not applied to spawned units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RaceModifiers {
    pub health: f32,
    pub damage: f32,
    pub cost: f32,
}

impl RaceData {
    pub fn for_race(race: Race) -> Self {
        match race {
            Race::Human => Self {
                description: "Balanced race with versatile units and solid defenses. Humans specialize in defensive structures and have well-rounded economy.",
                specialty: "Balanced units and defensive structures",
                offense: "Medium",
                defense: "High",
                economy: "Medium",
                modifiers: RaceModifiers { health: 1.1, damage: 1.0, cost: 1.0 },
            },
            Race::Undead => Self {
                description: "Undead forces focus on overwhelming enemies with cheap, expendable units. Their buildings produce units quickly, but have less health.",
                specialty: "Fast production and swarming tactics",
                offense: "High",
                defense: "Low",
                economy: "Medium",
                modifiers: RaceModifiers { health: 0.9, damage: 1.2, cost: 1.0 },
            },
            Race::Nature => Self {
                description: "Nature focuses on economy and regeneration. Their units are cheaper but individually weaker, making them excellent for early game rushes.",
                specialty: "Resource generation and economic advantage",
                offense: "Low",
                defense: "Medium",
                economy: "High",
                modifiers: RaceModifiers { health: 1.0, damage: 0.9, cost: 0.8 },
            },
            Race::Fire => Self {
                description: "Fire elementals deal massive damage but are fragile and expensive. Their buildings and units focus on dealing area damage to multiple targets.",
                specialty: "High damage and area of effect attacks",
                offense: "Very High",
                defense: "Very Low",
                economy: "Low",
                modifiers: RaceModifiers { health: 0.8, damage: 1.3, cost: 1.2 },
            },
        }
    }
}

/// Rule constants published to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSheet {
    pub board_width: f32,
    pub board_height: f32,
    pub lane_width: f32,
    pub building_phase_duration: u32,
    pub starting_gold: u32,
    pub base_income: u32,
    pub castle_max_health: i32,
    pub unit_move_speed: f32,
    pub attack_cooldown: f32,
    pub min_building_spacing: f32,
}

impl RuleSheet {
    pub fn new(building_phase_duration: u32) -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            lane_width: LANE_WIDTH,
            building_phase_duration,
            starting_gold: STARTING_GOLD,
            base_income: BASE_INCOME,
            castle_max_health: CASTLE_MAX_HEALTH,
            unit_move_speed: UNIT_MOVE_SPEED,
            attack_cooldown: ATTACK_COOLDOWN,
            min_building_spacing: MIN_BUILDING_SPACING,
        }
    }
}
