//! Behaviour tests for the recipe store services over the in-memory
//! document and blob backends.
//!
//! These scenarios walk the create/update/delete/search lifecycle the way
//! the recipe pages would, including the image blob bookkeeping around
//! updates and deletes.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::sync::Arc;

use client::domain::ports::{
    BlobPath, BlobReference, CreateRecipeRequest, DeleteRecipeRequest, GetRecipeRequest,
    ListRecipesRequest, RecipeCommand, RecipeQuery, SearchRecipesRequest, UpdateRecipeRequest,
};
use client::domain::{
    AccountId, Category, CategoryFilter, Error, ErrorCode, ImageSource, ImageUpload, Recipe,
    RecipeCommandService, RecipeDraft, RecipeId, RecipeQueryService,
};
use client::outbound::memory::{MemoryBlobStore, MemoryRecipeRepository};
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::Runtime;

const OWNER_ID: &str = "acct-1";
const FIRST_IMAGE: &str = "plated.jpg";
const REPLACEMENT_IMAGE: &str = "reshoot.jpg";

type Commands = Arc<RecipeCommandService<MemoryRecipeRepository, MemoryBlobStore>>;
type Queries = Arc<RecipeQueryService<MemoryRecipeRepository>>;

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct RecipeWorld {
    runtime: Slot<RuntimeHandle>,
    blobs: Slot<Arc<MemoryBlobStore>>,
    commands: Slot<Commands>,
    queries: Slot<Queries>,
    stored: Slot<Recipe>,
    updated: Slot<Recipe>,
    found: Slot<Vec<Recipe>>,
    last_error: Slot<Error>,
}

impl RecipeWorld {
    fn setup(&self) {
        let recipes = Arc::new(MemoryRecipeRepository::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let commands = Arc::new(RecipeCommandService::new(
            Arc::clone(&recipes),
            Arc::clone(&blobs),
            Arc::new(DefaultClock),
        ));
        let queries = Arc::new(RecipeQueryService::new(recipes));
        self.runtime
            .set(RuntimeHandle(Arc::new(Runtime::new().expect("create runtime"))));
        self.blobs.set(blobs);
        self.commands.set(commands);
        self.queries.set(queries);
    }

    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime is set").0
    }

    fn blobs(&self) -> Arc<MemoryBlobStore> {
        self.blobs.get().expect("blob backend is set")
    }

    fn commands(&self) -> Commands {
        self.commands.get().expect("command service is set")
    }

    fn queries(&self) -> Queries {
        self.queries.get().expect("query service is set")
    }

    fn stored_recipe(&self) -> Recipe {
        self.stored.get().expect("a recipe was stored")
    }

    fn failure(&self) -> Error {
        self.last_error.get().expect("a failed attempt was recorded")
    }

    fn create(
        &self,
        owner_id: Option<AccountId>,
        draft: RecipeDraft,
        image: Option<ImageSource>,
    ) -> Result<Recipe, Error> {
        let commands = self.commands();
        let request = CreateRecipeRequest {
            owner_id,
            draft,
            image,
        };
        self.runtime().block_on(commands.create_recipe(request))
    }

    fn get(&self, recipe_id: RecipeId) -> Result<Recipe, Error> {
        let queries = self.queries();
        self.runtime()
            .block_on(queries.get_recipe(GetRecipeRequest { recipe_id }))
    }

    fn list(&self) -> Vec<Recipe> {
        let queries = self.queries();
        self.runtime()
            .block_on(queries.list_recipes(ListRecipesRequest {
                owner_id: Some(owner()),
            }))
            .expect("listing succeeds")
    }

    fn search(&self, term: &str, category: CategoryFilter) {
        let queries = self.queries();
        let request = SearchRecipesRequest {
            owner_id: Some(owner()),
            term: term.to_owned(),
            category,
        };
        let found = self
            .runtime()
            .block_on(queries.search_recipes(request))
            .expect("searching succeeds");
        self.found.set(found);
    }

    fn found_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .found
            .get()
            .expect("a search ran")
            .iter()
            .map(|recipe| recipe.title().to_owned())
            .collect();
        titles.sort();
        titles
    }
}

fn owner() -> AccountId {
    AccountId::new(OWNER_ID).expect("owner id is non-empty")
}

fn picked_image(file_name: &str) -> ImageSource {
    let upload =
        ImageUpload::new(file_name, vec![0xFF, 0xD8, 0xFF, 0xE0]).expect("file name is non-blank");
    ImageSource::Upload(upload)
}

fn first_image_path() -> BlobPath {
    BlobPath::for_recipe_image(&owner(), FIRST_IMAGE)
}

fn pie_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Rhubarb pie".to_owned(),
        description: "Sharp rhubarb under a buttery lattice crust.".to_owned(),
        ingredients: "Rhubarb, sugar, flour, butter".to_owned(),
        instructions: "Macerate the rhubarb, then bake until golden.".to_owned(),
        prep_time_minutes: Some(20),
        cook_time_minutes: Some(45),
        category: Some(Category::Dessert),
    }
}

fn soup_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Tomato soup".to_owned(),
        description: "A warming bowl of blended summer vegetables.".to_owned(),
        ingredients: "Tomatoes, stock, basil".to_owned(),
        instructions: "Soften the base, then simmer and blend.".to_owned(),
        prep_time_minutes: Some(10),
        cook_time_minutes: Some(25),
        category: Some(Category::Soup),
    }
}

fn salad_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Green salad".to_owned(),
        description: "Crisp leaves under a mustard vinaigrette.".to_owned(),
        ingredients: "Lettuce, TOMATO wedges, olive oil".to_owned(),
        instructions: "Toss the leaves with the dressing just before serving.".to_owned(),
        prep_time_minutes: Some(15),
        cook_time_minutes: Some(5),
        category: Some(Category::Salad),
    }
}

fn pancake_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Pancakes".to_owned(),
        description: "Thin pancakes stacked with lemon and sugar.".to_owned(),
        ingredients: "Flour, eggs, milk".to_owned(),
        instructions: "Whisk the batter and fry each side until golden.".to_owned(),
        prep_time_minutes: Some(5),
        cook_time_minutes: Some(15),
        category: Some(Category::Breakfast),
    }
}

#[fixture]
fn world() -> RecipeWorld {
    RecipeWorld::default()
}

#[given("empty recipe backends")]
fn empty_recipe_backends(world: &RecipeWorld) {
    world.setup();
}

#[given("a stored recipe with an uploaded image")]
fn a_stored_recipe_with_an_uploaded_image(world: &RecipeWorld) {
    world.setup();
    let recipe = world
        .create(Some(owner()), pie_draft(), Some(picked_image(FIRST_IMAGE)))
        .expect("seeding the recipe succeeds");
    world.stored.set(recipe);
}

#[given("the blob backend refuses deletions")]
fn the_blob_backend_refuses_deletions(world: &RecipeWorld) {
    let blobs = world.blobs();
    world.runtime().block_on(blobs.set_fail_deletes(true));
}

#[given("a seeded recipe collection")]
fn a_seeded_recipe_collection(world: &RecipeWorld) {
    world.setup();
    for draft in [soup_draft(), salad_draft(), pancake_draft()] {
        world
            .create(Some(owner()), draft, None)
            .expect("seeding the collection succeeds");
    }
}

#[when("the owner submits a valid draft with a picked image file")]
fn the_owner_submits_a_valid_draft_with_a_picked_image_file(world: &RecipeWorld) {
    let recipe = world
        .create(Some(owner()), pie_draft(), Some(picked_image(FIRST_IMAGE)))
        .expect("a valid draft is accepted");
    world.stored.set(recipe);
}

#[when("the owner submits a draft that breaks every rule")]
fn the_owner_submits_a_draft_that_breaks_every_rule(world: &RecipeWorld) {
    let draft = RecipeDraft {
        title: "ab".to_owned(),
        description: "short".to_owned(),
        ingredients: String::new(),
        instructions: String::new(),
        prep_time_minutes: Some(-1),
        cook_time_minutes: Some(0),
        category: None,
    };
    let error = world
        .create(Some(owner()), draft, None)
        .expect_err("an invalid draft is refused");
    world.last_error.set(error);
}

#[when("a draft is submitted without an account")]
fn a_draft_is_submitted_without_an_account(world: &RecipeWorld) {
    let error = world
        .create(None, pie_draft(), None)
        .expect_err("an anonymous write is refused");
    world.last_error.set(error);
}

#[when("the owner resubmits the recipe with a replacement image file")]
fn the_owner_resubmits_the_recipe_with_a_replacement_image_file(world: &RecipeWorld) {
    let commands = world.commands();
    let request = UpdateRecipeRequest {
        recipe_id: world.stored_recipe().id().clone(),
        owner_id: Some(owner()),
        draft: pie_draft(),
        image: Some(picked_image(REPLACEMENT_IMAGE)),
    };
    let recipe = world
        .runtime()
        .block_on(commands.update_recipe(request))
        .expect("the update is accepted");
    world.updated.set(recipe);
}

#[when("the owner deletes the recipe")]
fn the_owner_deletes_the_recipe(world: &RecipeWorld) {
    let commands = world.commands();
    let stored = world.stored_recipe();
    let request = DeleteRecipeRequest {
        recipe_id: stored.id().clone(),
        image_url: stored.image_url().cloned(),
    };
    world
        .runtime()
        .block_on(commands.delete_recipe(request))
        .expect("the delete is accepted");
}

#[when("the owner searches for tomato across all categories")]
fn the_owner_searches_for_tomato_across_all_categories(world: &RecipeWorld) {
    world.search("tomato", CategoryFilter::All);
}

#[when("the owner searches for tomato among salads")]
fn the_owner_searches_for_tomato_among_salads(world: &RecipeWorld) {
    world.search("tomato", CategoryFilter::Only(Category::Salad));
}

#[when("the owner searches with an empty term across all categories")]
fn the_owner_searches_with_an_empty_term_across_all_categories(world: &RecipeWorld) {
    world.search("", CategoryFilter::All);
}

#[then("the stored recipe serves its image from the blob backend")]
fn the_stored_recipe_serves_its_image_from_the_blob_backend(world: &RecipeWorld) {
    let stored = world.stored_recipe();
    let url = stored.image_url().expect("the stored recipe has an image");
    assert_eq!(url.as_str(), "https://blobs.invalid/recipes/acct-1/plated.jpg");
    let blobs = world.blobs();
    assert!(world.runtime().block_on(blobs.contains_object(&first_image_path())));
}

#[then("fetching the recipe by id returns the stored record")]
fn fetching_the_recipe_by_id_returns_the_stored_record(world: &RecipeWorld) {
    let stored = world.stored_recipe();
    let fetched = world
        .get(stored.id().clone())
        .expect("the stored recipe is fetchable");
    assert_eq!(fetched, stored);
}

#[then("the owner's recipe list contains exactly the stored record")]
fn the_owners_recipe_list_contains_exactly_the_stored_record(world: &RecipeWorld) {
    assert_eq!(world.list(), vec![world.stored_recipe()]);
}

#[then("the failure carries a message for each invalid field")]
fn the_failure_carries_a_message_for_each_invalid_field(world: &RecipeWorld) {
    let error = world.failure();
    assert_eq!(error.code(), ErrorCode::ValidationFailed);
    assert_eq!(error.message(), "One or more fields are invalid.");
    let details = error.details().expect("validation failures carry details");
    let fields = details.as_object().expect("details are a field map");
    let expected = [
        ("title", "Title must be at least 3 characters"),
        ("description", "Description must be at least 10 characters"),
        ("ingredients", "Ingredients are required"),
        ("instructions", "Instructions are required"),
        ("prepTime", "Must be a positive number"),
        ("cookTime", "Must be a positive number"),
        ("category", "Category is required"),
    ];
    assert_eq!(fields.len(), expected.len());
    for (field, message) in expected {
        assert_eq!(
            fields.get(field).and_then(Value::as_str),
            Some(message),
            "unexpected message for {field}",
        );
    }
}

#[then("nothing was stored for the owner")]
fn nothing_was_stored_for_the_owner(world: &RecipeWorld) {
    assert!(world.list().is_empty());
}

#[then("the attempt fails with the signed-in requirement")]
fn the_attempt_fails_with_the_signed_in_requirement(world: &RecipeWorld) {
    let error = world.failure();
    assert_eq!(error.code(), ErrorCode::Unauthenticated);
    assert_eq!(error.message(), "You must be signed in to manage recipes.");
}

#[then("the replacement image is served for the recipe")]
fn the_replacement_image_is_served_for_the_recipe(world: &RecipeWorld) {
    let updated = world.updated.get().expect("the recipe was updated");
    let url = updated.image_url().expect("the updated recipe has an image");
    assert_eq!(url.as_str(), "https://blobs.invalid/recipes/acct-1/reshoot.jpg");
    let fetched = world
        .get(updated.id().clone())
        .expect("the updated recipe is fetchable");
    assert_eq!(fetched.image_url(), Some(url));
}

#[then("the original blob was deleted")]
fn the_original_blob_was_deleted(world: &RecipeWorld) {
    let blobs = world.blobs();
    let runtime = world.runtime();
    let path = first_image_path();
    assert!(!runtime.block_on(blobs.contains_object(&path)));
    let deleted = runtime.block_on(blobs.deleted_references());
    assert!(deleted.contains(&BlobReference::new(path.as_str())));
}

#[then("the original blob is still stored")]
fn the_original_blob_is_still_stored(world: &RecipeWorld) {
    let blobs = world.blobs();
    let runtime = world.runtime();
    assert!(runtime.block_on(blobs.contains_object(&first_image_path())));
    assert!(runtime.block_on(blobs.deleted_references()).is_empty());
}

#[then("fetching the recipe reports it is missing")]
fn fetching_the_recipe_reports_it_is_missing(world: &RecipeWorld) {
    let stored = world.stored_recipe();
    let error = world
        .get(stored.id().clone())
        .expect_err("the deleted recipe is gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Recipe not found.");
}

#[then("the soup and the salad are returned")]
fn the_soup_and_the_salad_are_returned(world: &RecipeWorld) {
    assert_eq!(world.found_titles(), vec!["Green salad", "Tomato soup"]);
}

#[then("only the salad is returned")]
fn only_the_salad_is_returned(world: &RecipeWorld) {
    assert_eq!(world.found_titles(), vec!["Green salad"]);
}

#[then("every seeded recipe is returned")]
fn every_seeded_recipe_is_returned(world: &RecipeWorld) {
    assert_eq!(
        world.found_titles(),
        vec!["Green salad", "Pancakes", "Tomato soup"]
    );
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "A draft with an uploaded image becomes a stored recipe"
)]
fn a_draft_with_an_uploaded_image_becomes_a_stored_recipe(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "An invalid draft reports a violation for every field"
)]
fn an_invalid_draft_reports_a_violation_for_every_field(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "Recipe writes require a signed-in account"
)]
fn recipe_writes_require_a_signed_in_account(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "Replacing an uploaded image deletes the old blob"
)]
fn replacing_an_uploaded_image_deletes_the_old_blob(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "A refused old-blob deletion does not block the update"
)]
fn a_refused_old_blob_deletion_does_not_block_the_update(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "Deleting a recipe removes the record and its image"
)]
fn deleting_a_recipe_removes_the_record_and_its_image(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "Search matches the term across title and ingredients"
)]
fn search_matches_the_term_across_title_and_ingredients(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "Search scoped to a category keeps only matching recipes"
)]
fn search_scoped_to_a_category_keeps_only_matching_recipes(world: RecipeWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_flows.feature",
    name = "An empty search term returns the full collection"
)]
fn an_empty_search_term_returns_the_full_collection(world: RecipeWorld) {
    drop(world);
}
