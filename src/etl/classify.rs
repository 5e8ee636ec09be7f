use std::collections::HashMap;

use crate::data::{Category, Priority, Tags};

/// How one tag key maps onto a category.
#[derive(Debug, Clone)]
pub struct TagRule {
    key: &'static str,
    values: HashMap<&'static str, Category>,
    /// Category for values missing from `values`. `None` leaves the classification untouched.
    fallback: Option<Category>,
}

impl TagRule {
    pub fn new(key: &'static str) -> Self {
        TagRule {
            key,
            values: HashMap::new(),
            fallback: None,
        }
    }

    pub fn value(mut self, value: &'static str, category: Category) -> Self {
        self.values.insert(value, category);
        self
    }

    pub fn values(mut self, values: &[&'static str], category: Category) -> Self {
        for &value in values {
            self.values.insert(value, category);
        }
        self
    }

    pub fn fallback(mut self, category: Category) -> Self {
        self.fallback = Some(category);
        self
    }

    fn apply(&self, tags: &Tags) -> Option<Category> {
        let value = tags.get(self.key)?;
        self.values.get(value.as_str()).copied().or(self.fallback)
    }
}

/// Category and derived draw tier of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
}

impl From<Category> for Classification {
    fn from(category: Category) -> Self {
        Classification {
            category,
            priority: category.priority(),
        }
    }
}

/// Maps tag sets to categories through an ordered list of rules. Every matching rule overwrites
/// the result of the ones before it, so later rules take precedence.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<TagRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(vec![
            TagRule::new("landuse")
                .values(
                    &["farmland", "farmyard", "meadow", "orchard", "vineyard", "allotments", "greenhouse_horticulture"],
                    Category::LanduseAgricultural,
                )
                .value("forest", Category::LanduseForest)
                .values(&["industrial", "quarry", "port"], Category::LanduseIndustrial)
                .values(
                    &["recreation_ground", "grass", "village_green", "cemetery"],
                    Category::LanduseRecreational,
                )
                .value("railway", Category::LanduseTransport)
                .values(&["commercial", "retail"], Category::LanduseCommercial)
                .value("residential", Category::LanduseResidential),
            TagRule::new("natural").value("water", Category::Lake),
            TagRule::new("water").fallback(Category::Lake),
            TagRule::new("highway")
                .values(&["motorway", "motorway_link", "motorway_junction"], Category::HighwayMotorway)
                .values(&["trunk", "trunk_link"], Category::HighwayTrunk)
                .values(&["primary", "primary_link"], Category::HighwayPrimary)
                .values(&["secondary", "secondary_link"], Category::HighwaySecondary)
                .values(&["tertiary", "tertiary_link"], Category::HighwayTertiary)
                .value("unclassified", Category::HighwayUnclassified)
                .value("residential", Category::HighwayResidential)
                .value("living_street", Category::HighwayLivingStreet)
                .value("service", Category::HighwayService)
                .value("pedestrian", Category::HighwayPedestrian)
                .value("track", Category::HighwayTrack)
                .values(&["bus_guideway", "busway"], Category::HighwayBusway)
                .value("footway", Category::HighwayFootway)
                .value("cycleway", Category::HighwayCycleway)
                .value("crossing", Category::FootwayCrossing)
                .fallback(Category::HighwayUnclassified),
            TagRule::new("footway")
                .value("sidewalk", Category::FootwaySidewalk)
                .value("crossing", Category::FootwayCrossing),
            TagRule::new("railway").fallback(Category::Railway),
            TagRule::new("waterway").fallback(Category::Waterway),
            TagRule::new("power")
                .values(&["line", "minor_line", "cable"], Category::PowerLine)
                .values(&["tower", "transformer", "substation"], Category::PowerDistribution)
                .fallback(Category::PowerDistribution),
        ])
    }
}

impl Classifier {
    pub fn new(rules: Vec<TagRule>) -> Self {
        Classifier { rules }
    }

    /// Appends a rule that outranks every existing one.
    pub fn with_rule(mut self, rule: TagRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn category(&self, tags: &Tags) -> Category {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(tags))
            .last()
            .unwrap_or_default()
    }

    pub fn classify(&self, tags: &Tags) -> Classification {
        self.category(tags).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn classify(pairs: &[(&str, &str)]) -> Classification {
        Classifier::default().classify(&tags(pairs))
    }

    #[test]
    fn motorway_is_the_most_important_tier() {
        let c = classify(&[("highway", "motorway")]);
        assert_eq!(c.category, Category::HighwayMotorway);
        assert_eq!(c.priority, Priority::ALL[0]);
    }

    #[test]
    fn buildings_and_untagged_ways_are_the_least_important_tier() {
        let last = *Priority::ALL.last().unwrap();
        assert_eq!(classify(&[("building", "yes")]).priority, last);
        assert_eq!(classify(&[]).priority, last);
        assert_eq!(classify(&[]).category, Category::Unknown);
    }

    #[test]
    fn unknown_highway_values_fall_back_to_unclassified() {
        assert_eq!(classify(&[("highway", "raceway")]).category, Category::HighwayUnclassified);
    }

    #[test]
    fn footway_refines_highway() {
        let c = classify(&[("highway", "footway"), ("footway", "sidewalk")]);
        assert_eq!(c.category, Category::FootwaySidewalk);
        let c = classify(&[("highway", "footway"), ("footway", "unknown")]);
        assert_eq!(c.category, Category::HighwayFootway);
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        assert_eq!(
            classify(&[("landuse", "farmland"), ("waterway", "river")]).category,
            Category::Waterway
        );
        assert_eq!(
            classify(&[("highway", "service"), ("railway", "tram")]).category,
            Category::Railway
        );
        assert_eq!(
            classify(&[("railway", "rail"), ("power", "line")]).category,
            Category::PowerLine
        );
    }

    #[test]
    fn unknown_landuse_keeps_previous_classification() {
        assert_eq!(classify(&[("landuse", "brownfield")]).category, Category::Unknown);
    }

    #[test]
    fn power_defaults_to_distribution() {
        assert_eq!(classify(&[("power", "pole")]).category, Category::PowerDistribution);
        assert_eq!(classify(&[("power", "pole")]).priority, Priority::Building);
    }

    #[test]
    fn custom_rules_take_precedence() {
        let classifier = Classifier::default()
            .with_rule(TagRule::new("aerialway").fallback(Category::PowerLine));
        let c = classifier.classify(&tags(&[("highway", "primary"), ("aerialway", "gondola")]));
        assert_eq!(c.category, Category::PowerLine);
    }
}
