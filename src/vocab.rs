use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A fixed, ordered set of options belonging to one category group
pub trait Vocabulary: Copy + Ord + fmt::Debug + 'static {
    /// Key of the group inside the clothing blob
    const GROUP: &'static str;
    /// Heading shown when asking the user
    const PROMPT: &'static str;
    /// Every option, in display and column order
    const ALL: &'static [Self];

    /// External text label, also the JSON key in stored rows
    fn label(self) -> &'static str;

    /// Option chosen when the user leaves the prompt blank
    fn default_option() -> Option<Self>;

    /// Exact label lookup, as used when decoding stored JSON
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.label() == label)
    }

    /// 1-based index lookup, as shown in prompts
    fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, group = $group:literal, prompt = $prompt:literal, default = $default:expr,
        { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Vocabulary for $name {
            const GROUP: &'static str = $group;
            const PROMPT: &'static str = $prompt;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn default_option() -> Option<Self> {
                $default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

vocabulary! {
    /// Jackets and sweaters
    Outerwear, group = "outerwear", prompt = "Outerwear", default = None, {
        None => "none",
        ThinSweater => "thin sweater",
        Sweater => "sweater",
        Windbreaker => "windbreaker",
        Jacket => "jacket",
        HeavyJacket => "heavy jacket",
    }
}

vocabulary! {
    Bottoms, group = "bottoms", prompt = "Bottoms", default = Some(Self::Athletic), {
        Athletic => "athletic",
        Shorts => "shorts",
        Sweatpants => "sweatpants",
        ColdPants => "cold pants",
    }
}

vocabulary! {
    Footwear, group = "footwear", prompt = "Footwear", default = Some(Self::Running), {
        Running => "running",
        ColdRunning => "cold running",
        Boots => "boots",
    }
}

vocabulary! {
    Accessory, group = "accessories", prompt = "Accessories", default = None, {
        None => "none",
        SunSleeves => "sun sleeves",
        Sunglasses => "sunglasses",
        Hat => "hat",
        Gloves => "gloves",
        Scarf => "scarf",
    }
}

vocabulary! {
    /// What the user was doing when the observation was logged
    Activity, group = "activity", prompt = "Activity", default = Some(Self::Walking), {
        Walking => "walking",
        Running => "running",
        Frisbee => "frisbee",
        Cycling => "cycling",
        Other => "other",
    }
}

vocabulary! {
    /// Sports the weather is judged suitable for
    Sport, group = "sports", prompt = "Sports", default = None, {
        Running => "running",
        Frisbee => "frisbee",
        Cycling => "cycling",
    }
}

/// Multi-select over one vocabulary.
///
/// Serializes as an object holding every option of the vocabulary mapped to
/// whether it is selected, in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<V: Vocabulary> {
    selected: BTreeSet<V>,
}

impl<V: Vocabulary> Default for Selection<V> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<V: Vocabulary> Selection<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection holding only the group's blank-input default, if it has one
    #[must_use]
    pub fn with_default() -> Self {
        V::default_option().into_iter().collect()
    }

    pub fn insert(&mut self, option: V) -> bool {
        self.selected.insert(option)
    }

    pub fn set(&mut self, option: V, value: bool) {
        if value {
            self.selected.insert(option);
        } else {
            self.selected.remove(&option);
        }
    }

    #[must_use]
    pub fn contains(&self, option: V) -> bool {
        self.selected.contains(&option)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected options in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = V> + '_ {
        self.selected.iter().copied()
    }

    /// Every option of the vocabulary with its flag, in vocabulary order
    pub fn flags(&self) -> impl Iterator<Item = (V, bool)> + '_ {
        V::ALL
            .iter()
            .map(move |option| (*option, self.selected.contains(option)))
    }
}

impl<V: Vocabulary> FromIterator<V> for Selection<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

impl<V: Vocabulary> Extend<V> for Selection<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.selected.extend(iter);
    }
}

impl<V: Vocabulary> Serialize for Selection<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(V::ALL.len()))?;
        for (option, value) in self.flags() {
            map.serialize_entry(option.label(), &value)?;
        }
        map.end()
    }
}

impl<'de, V: Vocabulary> Deserialize<'de> for Selection<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
        let mut selection = Self::new();
        for (key, value) in raw {
            let option = V::from_label(&key).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown {} option '{}'", V::GROUP, key))
            })?;
            selection.set(option, value);
        }
        Ok(selection)
    }
}

/// The four clothing groups, stored together in one blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingSelection {
    #[serde(default)]
    pub outerwear: Selection<Outerwear>,
    #[serde(default)]
    pub bottoms: Selection<Bottoms>,
    #[serde(default)]
    pub footwear: Selection<Footwear>,
    #[serde(default)]
    pub accessories: Selection<Accessory>,
}

pub type ActivitySelection = Selection<Activity>;

pub type SportsSuitability = Selection<Sport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_lookup() {
        for option in Outerwear::ALL {
            assert_eq!(Outerwear::from_label(option.label()), Some(*option));
        }
        assert_eq!(Accessory::from_label("sun sleeves"), Some(Accessory::SunSleeves));
        assert_eq!(Accessory::from_label("Sun Sleeves"), None);
    }

    #[test]
    fn index_lookup_is_one_based() {
        assert_eq!(Footwear::from_index(1), Some(Footwear::Running));
        assert_eq!(Footwear::from_index(3), Some(Footwear::Boots));
        assert_eq!(Footwear::from_index(0), None);
        assert_eq!(Footwear::from_index(4), None);
    }

    #[test]
    fn defaults_match_collector_behaviour() {
        assert!(Selection::<Outerwear>::with_default().is_empty());
        assert!(Selection::<Accessory>::with_default().is_empty());
        assert!(Selection::<Bottoms>::with_default().contains(Bottoms::Athletic));
        assert!(Selection::<Footwear>::with_default().contains(Footwear::Running));
        assert!(Selection::<Activity>::with_default().contains(Activity::Walking));
    }

    #[test]
    fn selection_serializes_every_option_in_order() {
        let selection: Selection<Sport> = [Sport::Cycling].into_iter().collect();
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"running":false,"frisbee":false,"cycling":true}"#);
    }

    #[test]
    fn selection_accepts_partial_maps_and_rejects_unknown_keys() {
        let selection: Selection<Activity> = serde_json::from_str(r#"{"walking":true}"#).unwrap();
        assert!(selection.contains(Activity::Walking));
        assert_eq!(selection.len(), 1);

        let err = serde_json::from_str::<Selection<Activity>>(r#"{"swimming":true}"#);
        assert!(err.is_err());
    }

    #[test]
    fn clothing_blob_nests_groups_by_name() {
        let clothing = ClothingSelection {
            outerwear: [Outerwear::Jacket].into_iter().collect(),
            ..ClothingSelection::default()
        };
        let value = serde_json::to_value(&clothing).unwrap();
        assert_eq!(value["outerwear"]["jacket"], true);
        assert_eq!(value["bottoms"]["athletic"], false);
        assert_eq!(value["accessories"]["sun sleeves"], false);
    }
}
