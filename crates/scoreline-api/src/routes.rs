use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;
use crate::{accounts, chats, friends, matches, tournaments};

/// Every ledger route. Transport layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // accounts & profiles
        .route("/accounts", post(accounts::create_account))
        .route("/profiles", get(accounts::list_profiles))
        .route(
            "/profiles/{profile_id}",
            get(accounts::get_profile).delete(accounts::delete_account),
        )
        .route("/profiles/{profile_id}/matches", get(accounts::list_profile_matches))
        .route("/profiles/{profile_id}/friends", get(accounts::list_profile_friends))
        .route("/profiles/{profile_id}/chats", get(accounts::list_profile_chats))
        // matches
        .route("/matches", post(matches::record_match))
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/winner", put(matches::assign_winner))
        // tournaments
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::settle_tournament),
        )
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        // friends
        .route("/friends", post(friends::add_friend).delete(friends::remove_friend))
        .route("/friends/{a}/{b}", get(friends::check_friendship))
        // chats
        .route("/chats", post(chats::create_chat))
        .route("/chats/{chat_id}", get(chats::get_chat))
        .route("/chats/{chat_id}/messages", get(chats::list_messages))
        .route(
            "/chats/{chat_id}/participants/{profile_id}",
            delete(chats::leave_chat),
        )
        .route("/messages", post(chats::post_message))
        .with_state(state)
}
