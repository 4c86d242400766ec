use axum::{
    Json,
    extract::{Query, State},
};
use tracing::debug;

use sketchwrite_store::{Store, StoreResult};
use sketchwrite_types::api::CollaborationResponse;

use crate::error::run_blocking;
use crate::prompts::LimitQuery;
use crate::{ApiError, AppState, shape};

const DEFAULT_LIMIT: u32 = 5;
const MAX_LIMIT: u32 = 20;

/// Pairs up to `limit` text prompts with an image submission each. A
/// prompt with no image response is skipped, so the result can be shorter
/// than `limit`. Nothing is cached; two calls can see different pairings
/// as submissions arrive.
pub fn synthesize(store: &dyn Store, limit: u32) -> StoreResult<Vec<CollaborationResponse>> {
    let candidates = store.list_text_prompts(limit)?;
    let mut pairings = Vec::new();

    for prompt in candidates {
        let Some(image) = store.newest_image_submission(prompt.id)? else {
            continue;
        };
        pairings.push(CollaborationResponse {
            id: format!("collab-{}-{}", prompt.id, image.id),
            prompt_id: prompt.id,
            image: image.content,
            image_alt: "Image by a community member".to_string(),
            text: prompt.content,
            collaborators: vec![
                shape::user_ref(store, Some(prompt.creator_id))?,
                shape::user_ref(store, image.user_id)?,
            ],
        });
    }

    Ok(pairings)
}

/// GET /collaborations?limit=1..20 (default 5)
pub async fn list_collaborations(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<CollaborationResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let store = state.store.clone();
    let pairings =
        run_blocking(move || synthesize(store.as_ref(), limit).map_err(ApiError::from)).await?;

    debug!("Synthesized {} collaborations (limit {limit})", pairings.len());
    Ok(Json(pairings))
}

#[cfg(test)]
mod tests {
    use sketchwrite_store::{MemoryStore, Store};
    use sketchwrite_types::api::UserRef;
    use sketchwrite_types::models::{ContentKind, NewPrompt, NewSubmission, NewUser, Prompt, Role};

    use super::synthesize;

    fn writer_prompt(store: &dyn Store, content: &str) -> Prompt {
        let creator = store
            .create_user(NewUser {
                username: format!("user-{content}"),
                password: "placeholder".to_string(),
                name: format!("Author of {content}"),
                avatar: None,
            })
            .expect("create user");
        store
            .create_prompt(NewPrompt {
                creator_id: creator.id,
                creator_role: Role::Writer,
                kind: ContentKind::Text,
                content: content.to_string(),
                is_active: true,
                is_daily: false,
                likes: 0,
            })
            .expect("create prompt")
    }

    fn image_submission(store: &dyn Store, prompt: &Prompt, anonymous: bool) {
        let user_id = if anonymous {
            None
        } else {
            Some(prompt.creator_id)
        };
        store
            .create_submission(NewSubmission {
                prompt_id: prompt.id,
                user_id,
                kind: ContentKind::Image,
                content: format!("/uploads/{}.png", prompt.id),
            })
            .expect("create submission");
    }

    #[test]
    fn pairs_only_prompts_that_have_an_image_submission() {
        let store = MemoryStore::new();
        let matched = writer_prompt(&store, "matched");
        let unmatched = writer_prompt(&store, "unmatched");
        image_submission(&store, &matched, false);
        // A text response does not make a pairing.
        store
            .create_submission(NewSubmission {
                prompt_id: unmatched.id,
                user_id: None,
                kind: ContentKind::Text,
                content: "words, not pictures".to_string(),
            })
            .expect("create submission");

        let pairings = synthesize(&store, 5).expect("synthesize");
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].prompt_id, matched.id);
        assert_eq!(pairings[0].text, "matched");
        assert_eq!(pairings[0].image, format!("/uploads/{}.png", matched.id));
    }

    #[test]
    fn honors_the_limit_with_more_pairs_available() {
        let store = MemoryStore::new();
        for i in 0..3 {
            let prompt = writer_prompt(&store, &format!("prompt-{i}"));
            image_submission(&store, &prompt, false);
        }

        let pairings = synthesize(&store, 2).expect("synthesize");
        assert_eq!(pairings.len(), 2);
    }

    #[test]
    fn anonymous_submitters_get_the_placeholder_identity() {
        let store = MemoryStore::new();
        let prompt = writer_prompt(&store, "anon");
        image_submission(&store, &prompt, true);

        let pairings = synthesize(&store, 5).expect("synthesize");
        assert_eq!(pairings[0].collaborators.len(), 2);
        assert_eq!(pairings[0].collaborators[1], UserRef::anonymous());
        assert_ne!(pairings[0].collaborators[0], UserRef::anonymous());
    }

    #[test]
    fn empty_store_yields_no_pairings() {
        let store = MemoryStore::new();
        assert!(synthesize(&store, 5).expect("synthesize").is_empty());
    }
}
