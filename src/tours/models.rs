//! Tour catalog types.
//!
//! A [`TourDefinition`] owns its night buckets, meal pricing and itinerary.
//! Prices are whole units of the base currency.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Currency every stored price and delta is denominated in.
pub const BASE_CURRENCY: &str = "USD";

// ==================== Night buckets ====================

/// Number of nights a bucket of options applies to.
///
/// Serialized as a decimal string (`"3"`), the legacy night key format.
/// Deserializes from either a string or an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NightCount(u32);

impl NightCount {
    /// Positive counts only.
    pub fn new(nights: u32) -> Option<Self> {
        (nights > 0).then_some(Self(nights))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NightCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NightCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(NightCount::new)
            .ok_or_else(|| format!("invalid night key '{}'", s))
    }
}

impl Serialize for NightCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NightCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u32),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
            Raw::Number(n) => {
                NightCount::new(n).ok_or_else(|| de::Error::custom("night count must be positive"))
            }
        }
    }
}

/// One add-on package for a specific night count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightOption {
    pub label: String,
    #[serde(default)]
    pub add_price: i64,
    #[serde(default)]
    pub old_add_price: i64,
}

/// Options offered for one night count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightBucket {
    pub nights: NightCount,
    #[serde(default)]
    pub options: Vec<NightOption>,
}

impl NightBucket {
    /// First option with the given label.
    pub fn option(&self, label: &str) -> Option<&NightOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

/// Night buckets in the order they were created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NightBuckets(Vec<NightBucket>);

impl NightBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&NightBucket> {
        self.0.first()
    }

    pub fn get(&self, nights: NightCount) -> Option<&NightBucket> {
        self.0.iter().find(|b| b.nights == nights)
    }

    pub fn get_mut(&mut self, nights: NightCount) -> Option<&mut NightBucket> {
        self.0.iter_mut().find(|b| b.nights == nights)
    }

    /// Look a bucket up by its serialized key.
    pub fn by_key(&self, key: &str) -> Option<&NightBucket> {
        key.parse().ok().and_then(|nights| self.get(nights))
    }

    /// Bucket for `nights`, appended empty when missing.
    pub fn ensure(&mut self, nights: NightCount) -> &mut NightBucket {
        match self.0.iter().position(|b| b.nights == nights) {
            Some(idx) => &mut self.0[idx],
            None => {
                self.0.push(NightBucket {
                    nights,
                    options: Vec::new(),
                });
                let last = self.0.len() - 1;
                &mut self.0[last]
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NightBucket> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NightBucket> for NightBuckets {
    fn from_iter<I: IntoIterator<Item = NightBucket>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ==================== Meal plans ====================

/// The three fixed meal-plan tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MealCategoryId {
    HalfBoard = 0,
    FullBoard = 1,
    AllInclusive = 2,
}

impl MealCategoryId {
    /// Ascending id order.
    pub const ALL: [MealCategoryId; 3] = [
        MealCategoryId::HalfBoard,
        MealCategoryId::FullBoard,
        MealCategoryId::AllInclusive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MealCategoryId::HalfBoard => "Half Board",
            MealCategoryId::FullBoard => "Full Board",
            MealCategoryId::AllInclusive => "All Inclusive",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for MealCategoryId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MealCategoryId::HalfBoard),
            1 => Ok(MealCategoryId::FullBoard),
            2 => Ok(MealCategoryId::AllInclusive),
            other => Err(format!("unknown meal category {}", other)),
        }
    }
}

impl From<MealCategoryId> for u8 {
    fn from(id: MealCategoryId) -> Self {
        id as u8
    }
}

/// Per-night, per-person meal surcharge for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPricing {
    #[serde(default)]
    pub add_price_per_night_per_person: i64,
    #[serde(default)]
    pub old_add_price_per_night_per_person: i64,
    #[serde(default)]
    pub offered: bool,
}

impl MealPricing {
    pub fn offered(add_price: i64, old_add_price: i64) -> Self {
        Self {
            add_price_per_night_per_person: add_price,
            old_add_price_per_night_per_person: old_add_price,
            offered: true,
        }
    }
}

/// Meal pricing indexed by [`MealCategoryId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealCategories([MealPricing; 3]);

impl MealCategories {
    pub fn get(&self, id: MealCategoryId) -> &MealPricing {
        &self.0[id.index()]
    }

    pub fn set(&mut self, id: MealCategoryId, pricing: MealPricing) {
        self.0[id.index()] = pricing;
    }

    /// Pricing for `id` if that category is offered.
    pub fn offered_pricing(&self, id: MealCategoryId) -> Option<&MealPricing> {
        Some(self.get(id)).filter(|p| p.offered)
    }

    /// Offered categories, lowest id first.
    pub fn offered(&self) -> impl Iterator<Item = (MealCategoryId, &MealPricing)> {
        MealCategoryId::ALL
            .into_iter()
            .map(move |id| (id, self.get(id)))
            .filter(|(_, p)| p.offered)
    }

    /// Number of meal plans a customer can pick from.
    pub fn available_count(&self) -> usize {
        self.offered().count()
    }
}

// ==================== Itinerary ====================

/// 1-based index of a middle itinerary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayIndex(pub u32);

impl DayIndex {
    /// Legacy field key for this day (`day_3`).
    pub fn field_key(self) -> String {
        format!("day_{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySegment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl DaySegment {
    /// Empty slot created when the night count grows.
    pub fn placeholder(day: DayIndex) -> Self {
        Self {
            title: format!("Day {} Title", day.0),
            activity: String::new(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddleDay {
    pub day: DayIndex,
    #[serde(flatten)]
    pub segment: DaySegment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub first_day: DaySegment,
    #[serde(default)]
    pub middle_days: Vec<MiddleDay>,
    #[serde(default)]
    pub last_day: DaySegment,
}

impl Itinerary {
    pub fn max_middle_day(&self) -> Option<DayIndex> {
        self.middle_days.iter().map(|d| d.day).max()
    }

    pub fn middle_day(&self, day: DayIndex) -> Option<&DaySegment> {
        self.middle_days
            .iter()
            .find(|d| d.day == day)
            .map(|d| &d.segment)
    }

    pub fn middle_day_mut(&mut self, day: DayIndex) -> Option<&mut DaySegment> {
        self.middle_days
            .iter_mut()
            .find(|d| d.day == day)
            .map(|d| &mut d.segment)
    }
}

// ==================== Tour ====================

/// Source markets a tour is sold into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Market {
    India = 1,
    China = 2,
    Asia = 3,
    MiddleEast = 4,
    RussiaCis = 5,
    RestOfWorld = 6,
}

impl Market {
    pub fn name(self) -> &'static str {
        match self {
            Market::India => "Indian Market",
            Market::China => "Chinese Market",
            Market::Asia => "Asian Markets",
            Market::MiddleEast => "Middle East Markets",
            Market::RussiaCis => "Russia and CIS Markets",
            Market::RestOfWorld => "Rest of the world",
        }
    }
}

impl TryFrom<u8> for Market {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Market::India),
            2 => Ok(Market::China),
            3 => Ok(Market::Asia),
            4 => Ok(Market::MiddleEast),
            5 => Ok(Market::RussiaCis),
            6 => Ok(Market::RestOfWorld),
            other => Err(format!("unknown market {}", other)),
        }
    }
}

impl From<Market> for u8 {
    fn from(market: Market) -> Self {
        market as u8
    }
}

/// Dates bounding when a tour is sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl ValidityWindow {
    /// Bookable while `today` is strictly before the expiry date.
    /// A tour without an expiry date stays bookable.
    pub fn is_bookable(&self, today: NaiveDate) -> bool {
        match self.expiry_date {
            Some(expiry) => today < expiry,
            None => true,
        }
    }
}

/// A priceable tour package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourDefinition {
    pub id: Uuid,
    pub title: String,
    pub country: String,
    pub markets: Vec<Market>,
    pub summary: String,
    pub base_price: i64,
    pub old_base_price: i64,
    pub person_count: u32,
    /// Night count last confirmed by the authoring flow.
    pub confirmed_nights: Option<NightCount>,
    pub nights: NightBuckets,
    pub meal_categories: MealCategories,
    pub itinerary: Itinerary,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub facilities: Vec<String>,
    pub tour_images: Vec<String>,
    pub destination_images: Vec<String>,
    pub activity_images: Vec<String>,
    pub hotel_images: Vec<String>,
    pub validity: ValidityWindow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for TourDefinition {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            country: String::new(),
            markets: Vec::new(),
            summary: String::new(),
            base_price: 0,
            old_base_price: 0,
            person_count: 1,
            confirmed_nights: None,
            nights: NightBuckets::new(),
            meal_categories: MealCategories::default(),
            itinerary: Itinerary::default(),
            inclusions: Vec::new(),
            exclusions: Vec::new(),
            facilities: Vec::new(),
            tour_images: Vec::new(),
            destination_images: Vec::new(),
            activity_images: Vec::new(),
            hotel_images: Vec::new(),
            validity: ValidityWindow::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TourDefinition {
    /// The tour as a new record: a fresh id, created and updated at `now`.
    ///
    /// Any id carried by the submitted body is discarded.
    pub fn into_new(self, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            ..self
        }
    }

    pub fn is_bookable(&self, today: NaiveDate) -> bool {
        self.validity.is_bookable(today)
    }

    /// Options of the confirmed night count, if any.
    pub fn confirmed_bucket(&self) -> Option<&NightBucket> {
        self.confirmed_nights.and_then(|n| self.nights.get(n))
    }
}

/// A customer's picks on a tour page. Every field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub nights_key: Option<String>,
    pub option_label: Option<String>,
    pub meal_category: Option<MealCategoryId>,
}

impl Selection {
    /// Night count the selection implies, 0 when unset or unparseable.
    pub fn nights_count(&self) -> u32 {
        self.nights_key
            .as_deref()
            .and_then(|k| k.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }
}
