//! Recipe data model.
//!
//! Drafts carry raw form input; validated field sets and stored recipes are
//! constructed through the validation rules so every write respects the
//! model invariants. Identifiers are opaque strings assigned by the document
//! backend on insert.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AccountId;
use crate::domain::validation::{self, Violations};

/// Validation errors returned by the recipe type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    /// Recipe id was missing or blank once trimmed.
    EmptyId,
    /// Owner id was missing or blank once trimmed.
    EmptyOwnerId,
    /// A stored timing field was zero; times are strictly positive.
    NonPositiveTime,
    /// The category name is not part of the fixed set.
    UnknownCategory,
    /// An image upload carried a blank file name.
    EmptyFileName,
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "recipe id must not be empty"),
            Self::EmptyOwnerId => write!(f, "owner id must not be empty"),
            Self::NonPositiveTime => write!(f, "timing fields must be strictly positive"),
            Self::UnknownCategory => write!(f, "category is not one of the fixed set"),
            Self::EmptyFileName => write!(f, "image file name must not be empty"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

/// Opaque recipe identifier assigned by the document backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeId(String);

impl RecipeId {
    /// Validate and construct a [`RecipeId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, RecipeValidationError> {
        if id.trim().is_empty() {
            return Err(RecipeValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for RecipeId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RecipeId> for String {
    fn from(value: RecipeId) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecipeId {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Fixed category set a recipe must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Main course.
    Main,
    /// Appetizer or starter.
    Appetizer,
    /// Dessert.
    Dessert,
    /// Beverage.
    Beverage,
    /// Soup.
    Soup,
    /// Salad.
    Salad,
    /// Breakfast dish.
    Breakfast,
    /// Snack.
    Snack,
}

impl Category {
    /// Every member of the fixed set, for input surfaces to enumerate.
    pub const ALL: [Category; 8] = [
        Category::Main,
        Category::Appetizer,
        Category::Dessert,
        Category::Beverage,
        Category::Soup,
        Category::Salad,
        Category::Breakfast,
        Category::Snack,
    ];

    /// Canonical lowercase name used on the wire and in filters.
    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Appetizer => "appetizer",
            Self::Dessert => "dessert",
            Self::Beverage => "beverage",
            Self::Soup => "soup",
            Self::Salad => "salad",
            Self::Breakfast => "breakfast",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = RecipeValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == value)
            .ok_or(RecipeValidationError::UnknownCategory)
    }
}

/// Category predicate for search, with the `all` sentinel matching anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    /// Match every category.
    #[default]
    All,
    /// Match exactly one category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether the filter admits the given category.
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => f.write_str(category.name()),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "all" {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

/// Raw recipe form input, prior to validation.
///
/// Timing fields stay optional signed integers so absent and non-positive
/// submissions reach the validation rules instead of failing at the type
/// boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    /// Dish title.
    pub title: String,
    /// Longer free-text description.
    pub description: String,
    /// Free text block listing ingredients.
    pub ingredients: String,
    /// Free text block of preparation steps.
    pub instructions: String,
    /// Preparation time in minutes.
    pub prep_time_minutes: Option<i64>,
    /// Cooking time in minutes.
    pub cook_time_minutes: Option<i64>,
    /// Category; `None` when the form field was left unset.
    pub category: Option<Category>,
}

/// Validated recipe field set.
///
/// ## Invariants
/// - Text fields satisfy the form rules (non-empty, minimum lengths).
/// - Timing fields are strictly positive minutes.
///
/// Construction goes through [`TryFrom<RecipeDraft>`], which reports every
/// violation together rather than the first one found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    title: String,
    description: String,
    ingredients: String,
    instructions: String,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    category: Category,
}

impl RecipeFields {
    /// Dish title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Longer free-text description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free text block listing ingredients.
    pub fn ingredients(&self) -> &str {
        self.ingredients.as_str()
    }

    /// Free text block of preparation steps.
    pub fn instructions(&self) -> &str {
        self.instructions.as_str()
    }

    /// Preparation time in minutes, strictly positive.
    pub fn prep_time_minutes(&self) -> u32 {
        self.prep_time_minutes
    }

    /// Cooking time in minutes, strictly positive.
    pub fn cook_time_minutes(&self) -> u32 {
        self.cook_time_minutes
    }

    /// Category from the fixed set.
    pub fn category(&self) -> Category {
        self.category
    }
}

impl TryFrom<RecipeDraft> for RecipeFields {
    type Error = Violations;

    fn try_from(draft: RecipeDraft) -> Result<Self, Self::Error> {
        let violations = validation::validate_recipe_draft(&draft);
        let (Some(prep_time_minutes), Some(cook_time_minutes)) = (
            validation::positive_minutes(draft.prep_time_minutes),
            validation::positive_minutes(draft.cook_time_minutes),
        ) else {
            return Err(violations);
        };
        let Some(category) = draft.category else {
            return Err(violations);
        };
        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self {
            title: draft.title,
            description: draft.description,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            prep_time_minutes,
            cook_time_minutes,
            category,
        })
    }
}

/// Image input accompanying a create or update.
///
/// Absent means "no image" on create and "keep the current image" on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSource {
    /// Raw bytes to upload to the owner-scoped blob path.
    Upload(ImageUpload),
    /// Externally-hosted URL stored as given; never probed for reachability.
    External(Url),
}

/// Raw image bytes plus the file name they were picked with.
///
/// The file name becomes the final path segment of the owner-scoped blob
/// path, so uploading two images with the same name overwrites the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ImageUploadDto", into = "ImageUploadDto")]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate and construct an upload from a picked file.
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, RecipeValidationError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyFileName);
        }
        Ok(Self { file_name, bytes })
    }

    /// File name the image was picked with.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageUploadDto {
    file_name: String,
    bytes: Vec<u8>,
}

impl From<ImageUpload> for ImageUploadDto {
    fn from(value: ImageUpload) -> Self {
        Self {
            file_name: value.file_name,
            bytes: value.bytes,
        }
    }
}

impl TryFrom<ImageUploadDto> for ImageUpload {
    type Error = RecipeValidationError;

    fn try_from(value: ImageUploadDto) -> Result<Self, Self::Error> {
        ImageUpload::new(value.file_name, value.bytes)
    }
}

/// Recipe record ready for insertion, before the backend assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    owner_id: AccountId,
    fields: RecipeFields,
    image_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl NewRecipe {
    /// Assemble an insertable record from validated parts.
    pub fn new(
        owner_id: AccountId,
        fields: RecipeFields,
        image_url: Option<Url>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            fields,
            image_url,
            created_at,
        }
    }

    /// Account the recipe will belong to.
    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    /// Validated field set.
    pub fn fields(&self) -> &RecipeFields {
        &self.fields
    }

    /// Resolved image URL, if any.
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    /// Creation timestamp stamped by the caller.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Replacement field set sent to the document backend on update.
///
/// Identifier, owner, and creation timestamp are never part of this set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeChanges {
    fields: RecipeFields,
    image_url: Option<Url>,
}

impl RecipeChanges {
    /// Assemble an update payload from validated parts.
    pub fn new(fields: RecipeFields, image_url: Option<Url>) -> Self {
        Self { fields, image_url }
    }

    /// Validated field set.
    pub fn fields(&self) -> &RecipeFields {
        &self.fields
    }

    /// Image URL after the update; `None` clears the image.
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }
}

/// Stored recipe owned by exactly one account.
///
/// ## Invariants
/// - `id` and `owner_id` are non-empty, assigned once, never updated.
/// - Timing fields are strictly positive minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "RecipeDto", into = "RecipeDto")]
pub struct Recipe {
    id: RecipeId,
    owner_id: AccountId,
    title: String,
    description: String,
    ingredients: String,
    instructions: String,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    category: Category,
    image_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl Recipe {
    /// Combine a backend-assigned id with the record that was inserted.
    pub fn from_new(id: RecipeId, record: NewRecipe) -> Self {
        Self {
            id,
            owner_id: record.owner_id,
            title: record.fields.title,
            description: record.fields.description,
            ingredients: record.fields.ingredients,
            instructions: record.fields.instructions,
            prep_time_minutes: record.fields.prep_time_minutes,
            cook_time_minutes: record.fields.cook_time_minutes,
            category: record.fields.category,
            image_url: record.image_url,
            created_at: record.created_at,
        }
    }

    /// The recipe with a replacement field set applied.
    ///
    /// Identifier, owner, and creation timestamp are preserved.
    pub fn updated_with(self, changes: &RecipeChanges) -> Self {
        Self {
            id: self.id,
            owner_id: self.owner_id,
            title: changes.fields.title.clone(),
            description: changes.fields.description.clone(),
            ingredients: changes.fields.ingredients.clone(),
            instructions: changes.fields.instructions.clone(),
            prep_time_minutes: changes.fields.prep_time_minutes,
            cook_time_minutes: changes.fields.cook_time_minutes,
            category: changes.fields.category,
            image_url: changes.image_url.clone(),
            created_at: self.created_at,
        }
    }

    /// Stable identifier assigned by the document backend.
    pub fn id(&self) -> &RecipeId {
        &self.id
    }

    /// Account the recipe belongs to.
    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    /// Dish title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Longer free-text description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free text block listing ingredients.
    pub fn ingredients(&self) -> &str {
        self.ingredients.as_str()
    }

    /// Free text block of preparation steps.
    pub fn instructions(&self) -> &str {
        self.instructions.as_str()
    }

    /// Preparation time in minutes, strictly positive.
    pub fn prep_time_minutes(&self) -> u32 {
        self.prep_time_minutes
    }

    /// Cooking time in minutes, strictly positive.
    pub fn cook_time_minutes(&self) -> u32 {
        self.cook_time_minutes
    }

    /// Category from the fixed set.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Attached image URL: a backend-owned blob URL or an external one.
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    /// Creation timestamp, stamped once when the record was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDto {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    ingredients: String,
    instructions: String,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeDto {
    fn from(value: Recipe) -> Self {
        Self {
            id: value.id.into(),
            owner_id: value.owner_id.into(),
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            instructions: value.instructions,
            prep_time_minutes: value.prep_time_minutes,
            cook_time_minutes: value.cook_time_minutes,
            category: value.category,
            image_url: value.image_url,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<RecipeDto> for Recipe {
    type Error = RecipeValidationError;

    fn try_from(value: RecipeDto) -> Result<Self, Self::Error> {
        if value.prep_time_minutes == 0 || value.cook_time_minutes == 0 {
            return Err(RecipeValidationError::NonPositiveTime);
        }
        Ok(Recipe {
            id: RecipeId::try_from(value.id)?,
            owner_id: AccountId::try_from(value.owner_id)
                .map_err(|_| RecipeValidationError::EmptyOwnerId)?,
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            instructions: value.instructions,
            prep_time_minutes: value.prep_time_minutes,
            cook_time_minutes: value.cook_time_minutes,
            category: value.category,
            image_url: value.image_url,
            created_at: value.created_at,
        })
    }
}
