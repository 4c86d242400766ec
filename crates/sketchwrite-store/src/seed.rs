//! Sample content for a fresh store: five users, two text prompts, two
//! image prompts, and a submission on each side so the collaboration feed
//! has something to pair. Runs only when the server finds an empty store
//! at startup; nothing else ever calls into here.

use tracing::{debug, info};

use sketchwrite_types::models::{ContentKind, NewPrompt, NewSubmission, NewUser, Role};

use crate::{Store, StoreResult};

/// Seeds only a pristine store, so restarting the server cannot
/// duplicate the sample rows. Returns whether seeding happened.
pub fn run_if_empty(store: &dyn Store) -> StoreResult<bool> {
    if store.count_users()? > 0 {
        debug!("Store already populated; skipping seed");
        return Ok(false);
    }
    run(store)?;
    Ok(true)
}

pub fn run(store: &dyn Store) -> StoreResult<()> {
    let alex = store.create_user(NewUser {
        username: "alexj".to_string(),
        password: "placeholder".to_string(),
        name: "Alex Janssen".to_string(),
        avatar: Some("https://images.unsplash.com/photo-1535713875002-d1d0cf377fde".to_string()),
    })?;
    let sara = store.create_user(NewUser {
        username: "saradv".to_string(),
        password: "placeholder".to_string(),
        name: "Sara de Vries".to_string(),
        avatar: Some("https://images.unsplash.com/photo-1494790108377-be9c29b29330".to_string()),
    })?;
    let thomas = store.create_user(NewUser {
        username: "thomasb".to_string(),
        password: "placeholder".to_string(),
        name: "Thomas Berg".to_string(),
        avatar: Some("https://images.unsplash.com/photo-1599566150163-29194dcaad36".to_string()),
    })?;
    let kim = store.create_user(NewUser {
        username: "kimv".to_string(),
        password: "placeholder".to_string(),
        name: "Kim Visser".to_string(),
        avatar: Some("https://images.unsplash.com/photo-1607746882042-944635dfe10e".to_string()),
    })?;
    let joost = store.create_user(NewUser {
        username: "joostb".to_string(),
        password: "placeholder".to_string(),
        name: "Joost Bakker".to_string(),
        avatar: Some("https://images.unsplash.com/photo-1472099645785-5658abf4ff4e".to_string()),
    })?;

    // Writer prompts: text seeds for sketchers to illustrate.
    let lighthouse = store.create_prompt(NewPrompt {
        creator_id: alex.id,
        creator_role: Role::Writer,
        kind: ContentKind::Text,
        content: "\"The old lighthouse stood alone at the edge of the cliffs, a silent \
                  sentinel over the raging sea. For years it had guided ships safely to \
                  shore, but now it stood abandoned, its light extinguished. Until that \
                  one stormy night, when its lantern flickered back to life for the \
                  first time in decades...\""
            .to_string(),
        is_active: true,
        is_daily: true,
        likes: 218,
    })?;
    store.create_prompt(NewPrompt {
        creator_id: sara.id,
        creator_role: Role::Writer,
        kind: ContentKind::Text,
        content: "\"The robot had spent 257 years in the abandoned library, reading and \
                  tending the books. Now, for the first time, a human had come in: a \
                  wide-eyed child, standing amazed between the endless rows of shelves. \
                  The robot did what it always did — it reached for the shelf and picked \
                  the perfect book for its new visitor...\""
            .to_string(),
        is_active: false,
        is_daily: false,
        likes: 183,
    })?;

    // Sketcher prompts: image seeds for writers to write about.
    store.create_prompt(NewPrompt {
        creator_id: thomas.id,
        creator_role: Role::Sketcher,
        kind: ContentKind::Image,
        content: "https://images.unsplash.com/photo-1618331835717-801e976710b2".to_string(),
        is_active: true,
        is_daily: true,
        likes: 218,
    })?;
    let butterfly = store.create_prompt(NewPrompt {
        creator_id: kim.id,
        creator_role: Role::Sketcher,
        kind: ContentKind::Image,
        content: "https://images.unsplash.com/photo-1613312968134-3fd240c3c9ad".to_string(),
        is_active: true,
        is_daily: false,
        likes: 183,
    })?;

    // A text response to an image prompt, and an image response to a text
    // prompt — the latter makes the first collaboration pairing.
    store.create_submission(NewSubmission {
        prompt_id: butterfly.id,
        user_id: Some(joost.id),
        kind: ContentKind::Text,
        content: "\"Model RK-7 was not designed to dream. Yet every night in standby it \
                  saw the butterflies. They danced through its memory circuits, bringing \
                  color where only binary belonged. When it met one in the park, its \
                  system froze for exactly 2.7 seconds. Its metallic hand reached out \
                  carefully, but the butterfly was already gone. In its log it wrote: \
                  'Today I learned what longing is.'\""
            .to_string(),
    })?;
    store.create_submission(NewSubmission {
        prompt_id: lighthouse.id,
        user_id: Some(thomas.id),
        kind: ContentKind::Image,
        content: "https://images.unsplash.com/photo-1582985412748-cf5339357e77".to_string(),
    })?;

    info!("Seeded store with sample users, prompts, and submissions");
    Ok(())
}
