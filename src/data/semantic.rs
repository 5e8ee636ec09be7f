/// Semantic classification of a way, derived once from its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    #[default]
    Unknown,
    HighwayMotorway,
    HighwayTrunk,
    HighwayPrimary,
    HighwaySecondary,
    HighwayTertiary,
    HighwayUnclassified,
    HighwayResidential,
    HighwayLivingStreet,
    HighwayService,
    HighwayPedestrian,
    HighwayTrack,
    HighwayBusway,
    HighwayFootway,
    HighwayCycleway,

    FootwaySidewalk,
    FootwayCrossing,

    Railway,
    Waterway,
    Lake,

    LanduseAgricultural,
    LanduseForest,
    LanduseIndustrial,
    LanduseRecreational,
    LanduseTransport,
    LanduseCommercial,
    LanduseResidential,

    PowerLine,
    PowerDistribution,
}

pub const CATEGORY_COUNT: usize = Category::ALL.len();

// `ALL` and the priority table are indexed by discriminant; the last variant pins their length.
const _: () = assert!(Category::PowerDistribution as usize + 1 == CATEGORY_COUNT);

impl Category {
    /// Every category in ordinal order.
    pub const ALL: [Category; 29] = [
        Category::Unknown,
        Category::HighwayMotorway,
        Category::HighwayTrunk,
        Category::HighwayPrimary,
        Category::HighwaySecondary,
        Category::HighwayTertiary,
        Category::HighwayUnclassified,
        Category::HighwayResidential,
        Category::HighwayLivingStreet,
        Category::HighwayService,
        Category::HighwayPedestrian,
        Category::HighwayTrack,
        Category::HighwayBusway,
        Category::HighwayFootway,
        Category::HighwayCycleway,
        Category::FootwaySidewalk,
        Category::FootwayCrossing,
        Category::Railway,
        Category::Waterway,
        Category::Lake,
        Category::LanduseAgricultural,
        Category::LanduseForest,
        Category::LanduseIndustrial,
        Category::LanduseRecreational,
        Category::LanduseTransport,
        Category::LanduseCommercial,
        Category::LanduseResidential,
        Category::PowerLine,
        Category::PowerDistribution,
    ];

    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub const fn priority(self) -> Priority {
        CATEGORY_PRIORITIES[self.ordinal()]
    }

    pub fn is_footway(self) -> bool {
        matches!(
            self,
            Category::FootwaySidewalk | Category::FootwayCrossing | Category::HighwayFootway
        )
    }

    /// Opaque polygon fills: anything unclassified plus power infrastructure.
    pub fn is_building(self) -> bool {
        matches!(self, Category::Unknown | Category::PowerDistribution)
    }

    pub fn is_track(self) -> bool {
        matches!(self, Category::HighwayTrack | Category::HighwayUnclassified)
    }

    pub fn line_width(self) -> u8 {
        match self {
            Category::HighwayMotorway | Category::HighwayTrunk => 3,
            Category::HighwayPrimary | Category::HighwaySecondary | Category::HighwayTertiary => 2,
            _ => 1,
        }
    }
}

/// Draw tier. Lower tiers are drawn first and survive longest when zooming out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Motorway,
    MajorHighway,
    MinorHighway,
    Agricultural,
    LocalStreet,
    ResidentialStreet,
    Pathway,
    Cycleway,
    Footway,
    Building,
}

pub const PRIORITY_COUNT: usize = Priority::ALL.len();

impl Priority {
    pub const RAILWAY: Priority = Priority::Motorway;
    pub const RIVER: Priority = Priority::Motorway;
    pub const INDUSTRIAL: Priority = Priority::Agricultural;
    pub const POWER_LINE: Priority = Priority::LocalStreet;
    pub const COMMERCIAL: Priority = Priority::LocalStreet;
    pub const RECREATIONAL: Priority = Priority::ResidentialStreet;

    pub const ALL: [Priority; 10] = [
        Priority::Motorway,
        Priority::MajorHighway,
        Priority::MinorHighway,
        Priority::Agricultural,
        Priority::LocalStreet,
        Priority::ResidentialStreet,
        Priority::Pathway,
        Priority::Cycleway,
        Priority::Footway,
        Priority::Building,
    ];

    pub const fn tier(self) -> usize {
        self as usize
    }

    pub fn from_tier(tier: usize) -> Option<Priority> {
        Priority::ALL.get(tier).copied()
    }
}

/// Priority per category, indexed by [`Category::ordinal`].
pub const CATEGORY_PRIORITIES: [Priority; CATEGORY_COUNT] = [
    Priority::Building,          // Unknown
    Priority::Motorway,          // HighwayMotorway
    Priority::MajorHighway,      // HighwayTrunk
    Priority::MajorHighway,      // HighwayPrimary
    Priority::MinorHighway,      // HighwaySecondary
    Priority::MinorHighway,      // HighwayTertiary
    Priority::LocalStreet,       // HighwayUnclassified
    Priority::ResidentialStreet, // HighwayResidential
    Priority::ResidentialStreet, // HighwayLivingStreet
    Priority::LocalStreet,       // HighwayService
    Priority::ResidentialStreet, // HighwayPedestrian
    Priority::Pathway,           // HighwayTrack
    Priority::LocalStreet,       // HighwayBusway
    Priority::Footway,           // HighwayFootway
    Priority::Cycleway,          // HighwayCycleway
    Priority::Footway,           // FootwaySidewalk
    Priority::Footway,           // FootwayCrossing
    Priority::RAILWAY,           // Railway
    Priority::RIVER,             // Waterway
    Priority::RIVER,             // Lake
    Priority::Agricultural,      // LanduseAgricultural
    Priority::Agricultural,      // LanduseForest
    Priority::INDUSTRIAL,        // LanduseIndustrial
    Priority::RECREATIONAL,      // LanduseRecreational
    Priority::LocalStreet,       // LanduseTransport
    Priority::COMMERCIAL,        // LanduseCommercial
    Priority::ResidentialStreet, // LanduseResidential
    Priority::POWER_LINE,        // PowerLine
    Priority::Building,          // PowerDistribution
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_priority() {
        assert_eq!(CATEGORY_PRIORITIES.len(), CATEGORY_COUNT);
        for (ordinal, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.ordinal(), ordinal, "{category:?} out of order");
        }
    }

    /// Exhaustive, so a new variant does not compile until it is placed in the chain.
    fn successor(category: Category) -> Option<Category> {
        use Category::*;
        match category {
            Unknown => Some(HighwayMotorway),
            HighwayMotorway => Some(HighwayTrunk),
            HighwayTrunk => Some(HighwayPrimary),
            HighwayPrimary => Some(HighwaySecondary),
            HighwaySecondary => Some(HighwayTertiary),
            HighwayTertiary => Some(HighwayUnclassified),
            HighwayUnclassified => Some(HighwayResidential),
            HighwayResidential => Some(HighwayLivingStreet),
            HighwayLivingStreet => Some(HighwayService),
            HighwayService => Some(HighwayPedestrian),
            HighwayPedestrian => Some(HighwayTrack),
            HighwayTrack => Some(HighwayBusway),
            HighwayBusway => Some(HighwayFootway),
            HighwayFootway => Some(HighwayCycleway),
            HighwayCycleway => Some(FootwaySidewalk),
            FootwaySidewalk => Some(FootwayCrossing),
            FootwayCrossing => Some(Railway),
            Railway => Some(Waterway),
            Waterway => Some(Lake),
            Lake => Some(LanduseAgricultural),
            LanduseAgricultural => Some(LanduseForest),
            LanduseForest => Some(LanduseIndustrial),
            LanduseIndustrial => Some(LanduseRecreational),
            LanduseRecreational => Some(LanduseTransport),
            LanduseTransport => Some(LanduseCommercial),
            LanduseCommercial => Some(LanduseResidential),
            LanduseResidential => Some(PowerLine),
            PowerLine => Some(PowerDistribution),
            PowerDistribution => None,
        }
    }

    #[test]
    fn every_variant_is_listed_in_order() {
        let chain: Vec<Category> =
            std::iter::successors(Some(Category::Unknown), |c| successor(*c)).collect();
        assert_eq!(chain.len(), CATEGORY_COUNT);
        assert_eq!(chain, Category::ALL);
        for category in chain {
            let _ = category.priority();
        }
    }

    #[test]
    fn tiers_are_dense() {
        for (tier, priority) in Priority::ALL.iter().enumerate() {
            assert_eq!(priority.tier(), tier);
            assert_eq!(Priority::from_tier(tier), Some(*priority));
        }
        assert_eq!(Priority::from_tier(PRIORITY_COUNT), None);
    }

    #[test]
    fn collapsed_tiers_share_a_slot() {
        assert_eq!(Category::Railway.priority(), Category::HighwayMotorway.priority());
        assert_eq!(Category::Waterway.priority(), Priority::Motorway);
        assert_eq!(Category::PowerLine.priority(), Category::HighwayService.priority());
        assert_eq!(Category::Unknown.priority(), Priority::Building);
    }

    #[test]
    fn line_widths() {
        assert_eq!(Category::HighwayMotorway.line_width(), 3);
        assert_eq!(Category::HighwayTertiary.line_width(), 2);
        assert_eq!(Category::HighwayResidential.line_width(), 1);
        assert_eq!(Category::Railway.line_width(), 1);
    }
}
