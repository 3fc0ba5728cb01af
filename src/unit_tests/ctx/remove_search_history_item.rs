use std::any::Any;

use futures::future;

use crate::models::common::PendingOperation;
use crate::models::ctx::{
    Ctx, CtxError, SearchHistoryLoadRequest, SearchHistoryMutation, SearchHistoryStatus,
};
use crate::runtime::msg::{Action, ActionCtx, Event, Internal, Msg};
use crate::runtime::{EnvError, EnvFutureExt, Model, Runtime, RuntimeAction, TryEnvFuture};
use crate::types::api::{APIResponse, SearchHistoryItemResponse};
use crate::types::search_history::{RecentSearchEntry, SearchType};
use crate::unit_tests::{
    anonymous_ctx, authenticated_ctx, core_events, database_entry, default_fetch_handler,
    local_entry, minutes_ago, store_local_entries, stored_local_entries, Request, TestEnv,
    FETCH_HANDLER, REQUESTS, SEARCH_HISTORY_URL, USER_ID,
};

fn remove_action(entry: RecentSearchEntry) -> RuntimeAction<TestEnv, Ctx> {
    RuntimeAction {
        field: None,
        action: Action::Ctx(ActionCtx::RemoveSearchHistoryItem(entry)),
    }
}

#[test]
fn actionctx_remove_search_history_item() {
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    let dune = local_entry("dune", SearchType::Movie, minutes_ago(1));
    let severance = local_entry("severance", SearchType::Tv, minutes_ago(2));
    store_local_entries(&[dune.to_owned(), severance.to_owned()]);
    let (runtime, mut rx) = Runtime::<TestEnv, _>::new(anonymous_ctx(), vec![], 1000);
    TestEnv::run(|| {
        runtime.dispatch(RuntimeAction {
            field: None,
            action: Action::Ctx(ActionCtx::LoadSearchHistory),
        })
    });
    core_events(&mut rx);
    TestEnv::run(|| {
        runtime.dispatch(remove_action(local_entry(
            "DUNE",
            SearchType::Movie,
            minutes_ago(30),
        )))
    });
    assert_eq!(
        runtime.model().unwrap().search_history.items,
        vec![severance.to_owned()],
        "Entry removed by query and type"
    );
    assert_eq!(stored_local_entries(), Some(vec![severance]));
    assert_eq!(
        core_events(&mut rx),
        vec![
            Event::SearchHistoryItemRemoved {
                query: "dune".to_owned(),
                r#type: SearchType::Movie,
            },
            Event::SearchHistoryPushedToStorage { uid: None },
        ]
    );
}

#[test]
fn actionctx_remove_search_history_item_last() {
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    let dune = local_entry("dune", SearchType::Movie, minutes_ago(1));
    store_local_entries(&[dune.to_owned()]);
    let mut ctx = anonymous_ctx();
    ctx.search_history.items = vec![dune.to_owned()];
    let (runtime, _rx) = Runtime::<TestEnv, _>::new(ctx, vec![], 1000);
    TestEnv::run(|| runtime.dispatch(remove_action(dune)));
    assert!(runtime.model().unwrap().search_history.items.is_empty());
    assert_eq!(stored_local_entries(), None, "Storage key removed");
}

#[test]
fn actionctx_remove_search_history_item_missing() {
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    let (runtime, mut rx) = Runtime::<TestEnv, _>::new(anonymous_ctx(), vec![], 1000);
    TestEnv::run(|| {
        runtime.dispatch(remove_action(local_entry(
            "dune",
            SearchType::Movie,
            minutes_ago(1),
        )))
    });
    assert!(core_events(&mut rx).is_empty());
    assert_eq!(stored_local_entries(), None);
}

#[test]
fn actionctx_remove_search_history_item_with_user() {
    fn fetch_handler(request: Request) -> TryEnvFuture<Box<dyn Any + Send>> {
        match request {
            Request { url, method, .. }
                if url == format!("{SEARCH_HISTORY_URL}/id%201") && method == "DELETE" =>
            {
                future::ok(
                    Box::new(APIResponse::ok(serde_json::Value::Null)) as Box<dyn Any + Send>
                )
                .boxed_env()
            }
            _ => default_fetch_handler(request),
        }
    }
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    *FETCH_HANDLER.write().unwrap() = Box::new(fetch_handler);
    let dune = database_entry("id 1", "dune", SearchType::Movie, minutes_ago(1));
    let severance = database_entry("id 2", "severance", SearchType::Tv, minutes_ago(2));
    let (runtime, mut rx) = Runtime::<TestEnv, _>::new(
        authenticated_ctx(vec![dune.to_owned(), severance.to_owned()]),
        vec![],
        1000,
    );
    TestEnv::run(|| runtime.dispatch(remove_action(dune)));
    assert_eq!(
        runtime.model().unwrap().search_history.items,
        vec![severance]
    );
    assert_eq!(REQUESTS.read().unwrap().len(), 1, "One request has been sent");
    assert_eq!(stored_local_entries(), None, "Storage is not touched");
    assert_eq!(
        core_events(&mut rx),
        vec![Event::SearchHistoryItemRemoved {
            query: "dune".to_owned(),
            r#type: SearchType::Movie,
        }]
    );
}

#[test]
fn actionctx_remove_search_history_item_with_user_failure() {
    fn fetch_handler(request: Request) -> TryEnvFuture<Box<dyn Any + Send>> {
        match request {
            Request { method, .. } if method == "DELETE" => {
                future::err(EnvError::Fetch("500 Internal Server Error".to_owned())).boxed_env()
            }
            _ => default_fetch_handler(request),
        }
    }
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    *FETCH_HANDLER.write().unwrap() = Box::new(fetch_handler);
    let items = vec![
        database_entry("1", "dune", SearchType::Movie, minutes_ago(1)),
        database_entry("2", "severance", SearchType::Tv, minutes_ago(2)),
        database_entry("3", "alien", SearchType::Movie, minutes_ago(3)),
    ];
    let (runtime, mut rx) =
        Runtime::<TestEnv, _>::new(authenticated_ctx(items.to_owned()), vec![], 1000);
    TestEnv::run(|| runtime.dispatch(remove_action(items[1].to_owned())));
    assert_eq!(
        runtime.model().unwrap().search_history.items,
        items,
        "Removed entry restored in place"
    );
    assert_eq!(stored_local_entries(), None, "No local fallback");
    assert_eq!(
        core_events(&mut rx),
        vec![Event::Error {
            error: CtxError::Env(EnvError::Fetch("500 Internal Server Error".to_owned())),
            source: Box::new(Event::SearchHistoryItemRemoved {
                query: "severance".to_owned(),
                r#type: SearchType::Tv,
            }),
        }]
    );
}

#[test]
fn actionctx_remove_search_history_item_with_user_local_entry() {
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    let dune = local_entry("dune", SearchType::Movie, minutes_ago(1));
    let severance = database_entry("2", "severance", SearchType::Tv, minutes_ago(2));
    store_local_entries(&[dune.to_owned()]);
    let (runtime, _rx) = Runtime::<TestEnv, _>::new(
        authenticated_ctx(vec![dune.to_owned(), severance.to_owned()]),
        vec![],
        1000,
    );
    TestEnv::run(|| runtime.dispatch(remove_action(dune)));
    assert_eq!(
        runtime.model().unwrap().search_history.items,
        vec![severance]
    );
    assert!(REQUESTS.read().unwrap().is_empty(), "No requests have been sent");
    assert_eq!(stored_local_entries(), None);
}

#[test]
fn search_history_delete_result_from_previous_session_is_dropped() {
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    let dune = database_entry("1", "dune", SearchType::Movie, minutes_ago(1));
    let mut ctx = authenticated_ctx(vec![]);
    let mut previous = authenticated_ctx(vec![dune.to_owned()]).search_history;
    let operation =
        PendingOperation::apply(&mut previous, SearchHistoryMutation::Remove(vec![dune]));
    let (effects, fields) = <Ctx as Model<TestEnv>>::update(
        &mut ctx,
        &Msg::Internal(Internal::SearchHistoryItemDeleteResult(
            "previous_auth_key".to_owned(),
            operation,
            Err(CtxError::Env(EnvError::Fetch("Network error".to_owned()))),
        )),
    );
    assert!(effects.is_empty());
    assert!(fields.is_empty());
    assert!(
        ctx.search_history.items.is_empty(),
        "Rollback of another session is not applied"
    );
}

#[test]
fn actionctx_remove_search_history_item_while_migrating() {
    fn fetch_handler(request: Request) -> TryEnvFuture<Box<dyn Any + Send>> {
        match request {
            Request { url, method, .. } if url == SEARCH_HISTORY_URL && method == "POST" => {
                future::ok(
                    Box::new(APIResponse::ok(serde_json::Value::Null)) as Box<dyn Any + Send>
                )
                .boxed_env()
            }
            Request { url, method, .. } if url == SEARCH_HISTORY_URL && method == "GET" => {
                future::ok(Box::new(APIResponse::<Vec<SearchHistoryItemResponse>>::ok(vec![]))
                    as Box<dyn Any + Send>)
                .boxed_env()
            }
            _ => default_fetch_handler(request),
        }
    }
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    *FETCH_HANDLER.write().unwrap() = Box::new(fetch_handler);
    let dune = local_entry("dune", SearchType::Movie, minutes_ago(1));
    let alien = local_entry("alien", SearchType::Movie, minutes_ago(2));
    let local = vec![dune, alien.to_owned()];
    store_local_entries(&local);
    let request = SearchHistoryLoadRequest {
        uid: Some(USER_ID.to_owned()),
        generation: 1,
        migrate_local: true,
    };
    let mut ctx = authenticated_ctx(vec![]);
    ctx.search_history_generation = 1;
    ctx.search_history_status = SearchHistoryStatus::Loading(request.to_owned());
    let (effects, _) = <Ctx as Model<TestEnv>>::update(
        &mut ctx,
        &Msg::Internal(Internal::SearchHistoryAPIResult(
            request.to_owned(),
            local.to_owned(),
            Ok(vec![]),
        )),
    );
    assert_eq!(ctx.search_history_status, SearchHistoryStatus::Migrating(request));
    let (runtime, _rx) = Runtime::<TestEnv, _>::new(ctx, effects, 1000);
    TestEnv::run(|| runtime.dispatch(remove_action(alien)));
    assert_eq!(
        stored_local_entries(),
        None,
        "Migrated entries are not written back to storage"
    );
    TestEnv::run(|| {
        runtime.dispatch(RuntimeAction {
            field: None,
            action: Action::Ctx(ActionCtx::LoadSearchHistory),
        })
    });
    assert_eq!(
        REQUESTS
            .read()
            .unwrap()
            .iter()
            .filter(|request| request.method == "POST")
            .count(),
        2,
        "Local entries are migrated once"
    );
    assert_eq!(
        runtime.model().unwrap().search_history_status,
        SearchHistoryStatus::Ready
    );
}
