use std::collections::HashSet;

use enclose::enclose;
use futures::{future, FutureExt, TryFutureExt};
use serde::Deserialize;

use crate::constants::{
    RECENT_SEARCHES_STORAGE_KEY, SEARCH_HISTORY_LOCAL_CAP, SEARCH_HISTORY_MERGED_CAP,
};
use crate::models::common::{eq_update, PendingOperation};
use crate::models::ctx::{
    CtxError, SearchHistoryLoadRequest, SearchHistoryMutation, SearchHistoryStatus,
};
use crate::runtime::msg::{Action, ActionCtx, Event, Internal, Msg, SearchHistoryPendingOperation};
use crate::runtime::{
    ConditionalSend, Effect, EffectFuture, Effects, Env, EnvFuture, EnvFutureExt, TryEnvFuture,
};
use crate::types::api::{
    fetch_api, SearchHistoryItemRequest, SearchHistoryItemResponse, SearchHistoryRequest,
    SuccessResponse,
};
use crate::types::profile::{AuthKey, Profile};
use crate::types::search_history::{EntrySource, RecentSearchEntry, SearchHistoryBucket};

pub fn update_search_history<E: Env + 'static>(
    search_history: &mut SearchHistoryBucket,
    status: &mut SearchHistoryStatus,
    generation: &mut u64,
    profile: &Profile,
    msg: &Msg,
) -> Effects {
    match msg {
        Msg::Action(Action::Ctx(ActionCtx::Authenticate(_)))
        | Msg::Action(Action::Ctx(ActionCtx::Logout)) => {
            let next_search_history = SearchHistoryBucket {
                uid: profile.uid(),
                items: vec![],
            };
            eq_update(search_history, next_search_history)
                .join(load_search_history::<E>(status, generation, profile, true))
        }
        Msg::Action(Action::Ctx(ActionCtx::LoadSearchHistory)) => {
            reload_search_history::<E>(status, generation, profile)
        }
        Msg::Action(Action::Ctx(ActionCtx::AddSearchHistoryItem { query, r#type })) => {
            let source = match profile.auth_key() {
                Some(_) => EntrySource::Database,
                None => EntrySource::Local,
            };
            match (
                RecentSearchEntry::new(query, *r#type, E::now(), source),
                profile.auth_key(),
            ) {
                (Some(entry), Some(auth_key)) => {
                    Effects::one(push_item_to_api::<E>(entry, auth_key)).unchanged()
                }
                (Some(entry), None) => {
                    let added_event = Event::SearchHistoryItemAdded {
                        query: entry.query.to_owned(),
                        r#type: entry.r#type,
                    };
                    search_history.upsert(entry.to_owned(), SEARCH_HISTORY_LOCAL_CAP);
                    Effects::none()
                        .join(persist_local_change::<E, _>(
                            status,
                            generation,
                            profile,
                            move |search_history| {
                                search_history.upsert(entry, SEARCH_HISTORY_LOCAL_CAP)
                            },
                        ))
                        .join(Effects::msg(Msg::Event(added_event)).unchanged())
                }
                (None, _) => Effects::none().unchanged(),
            }
        }
        Msg::Action(Action::Ctx(ActionCtx::RemoveSearchHistoryItem(entry))) => {
            match (profile.auth_key(), entry.source, &entry.id) {
                (Some(auth_key), EntrySource::Database, Some(id)) => {
                    let operation = PendingOperation::apply(
                        search_history,
                        SearchHistoryMutation::Remove(vec![entry.to_owned()]),
                    );
                    let has_changed = !operation.inverse.entries().is_empty();
                    let effects =
                        Effects::one(delete_item_from_api::<E>(id, operation, auth_key));
                    if has_changed {
                        effects
                    } else {
                        effects.unchanged()
                    }
                }
                _ => match search_history.remove(&entry.key()) {
                    Some(removed) => {
                        let key = removed.key();
                        Effects::none()
                            .join(persist_local_change::<E, _>(
                                status,
                                generation,
                                profile,
                                move |search_history| {
                                    search_history.remove(&key);
                                },
                            ))
                            .join(
                                Effects::msg(Msg::Event(Event::SearchHistoryItemRemoved {
                                    query: removed.query,
                                    r#type: removed.r#type,
                                }))
                                .unchanged(),
                            )
                    }
                    None => Effects::none().unchanged(),
                },
            }
        }
        Msg::Action(Action::Ctx(ActionCtx::ClearSearchHistory)) => match profile.auth_key() {
            Some(auth_key) => {
                let items = search_history.items.to_owned();
                let has_changed = !items.is_empty();
                let operation =
                    PendingOperation::apply(search_history, SearchHistoryMutation::Remove(items));
                let effects = Effects::one(clear_api::<E>(operation, auth_key));
                if has_changed {
                    effects
                } else {
                    effects.unchanged()
                }
            }
            None => {
                let cleared_event = Event::SearchHistoryCleared {
                    uid: search_history.uid.to_owned(),
                };
                search_history.items.clear();
                Effects::none()
                    .join(persist_local_change::<E, _>(
                        status,
                        generation,
                        profile,
                        |search_history| search_history.items.clear(),
                    ))
                    .join(Effects::msg(Msg::Event(cleared_event)).unchanged())
            }
        },
        Msg::Internal(Internal::SearchHistoryStorageResult(request, local))
            if *status == SearchHistoryStatus::Loading(request.to_owned()) =>
        {
            *status = SearchHistoryStatus::Ready;
            tracing::debug!("Search history loaded from storage: {} items", local.len());
            let next_search_history = SearchHistoryBucket::new(
                request.uid.to_owned(),
                local.to_owned(),
                SEARCH_HISTORY_LOCAL_CAP,
            );
            eq_update(search_history, next_search_history).join(
                Effects::msg(Msg::Event(Event::SearchHistoryPulledFromStorage {
                    uid: request.uid.to_owned(),
                }))
                .unchanged(),
            )
        }
        Msg::Internal(Internal::SearchHistoryAPIResult(request, local, result))
            if *status == SearchHistoryStatus::Loading(request.to_owned()) =>
        {
            let pulled_event = Event::SearchHistoryPulledFromAPI {
                uid: request.uid.to_owned(),
            };
            match (result, profile.auth_key()) {
                (Ok(database), Some(auth_key)) => {
                    tracing::debug!(
                        "Search history loaded from API: {} items, {} local",
                        database.len(),
                        local.len()
                    );
                    let next_search_history = SearchHistoryBucket {
                        uid: request.uid.to_owned(),
                        items: SearchHistoryBucket::merge(local.to_owned(), database.to_owned()),
                    };
                    let migration_effects = if local.is_empty() || !request.migrate_local {
                        *status = SearchHistoryStatus::Ready;
                        Effects::none().unchanged()
                    } else {
                        *status = SearchHistoryStatus::Migrating(request.to_owned());
                        Effects::one(migrate_items_to_api::<E>(
                            request.to_owned(),
                            local.to_owned(),
                            auth_key,
                        ))
                        .unchanged()
                    };
                    eq_update(search_history, next_search_history)
                        .join(Effects::msg(Msg::Event(pulled_event)).unchanged())
                        .join(migration_effects)
                }
                (result, _) => {
                    *status = SearchHistoryStatus::Ready;
                    let error = match result {
                        Err(error) => {
                            tracing::warn!(
                                "Failed to pull search history from API, using local: {}",
                                error
                            );
                            Some(error.to_owned())
                        }
                        Ok(_) => None,
                    };
                    let next_search_history = SearchHistoryBucket::new(
                        request.uid.to_owned(),
                        local.to_owned(),
                        SEARCH_HISTORY_LOCAL_CAP,
                    );
                    let error_effects = match error {
                        Some(error) => Effects::msg(Msg::Event(Event::Error {
                            error,
                            source: Box::new(pulled_event),
                        }))
                        .unchanged(),
                        None => Effects::none().unchanged(),
                    };
                    eq_update(search_history, next_search_history).join(error_effects)
                }
            }
        }
        Msg::Internal(Internal::SearchHistoryStoragePatched(request))
            if *status == SearchHistoryStatus::Loading(request.to_owned()) =>
        {
            Effects::one(pull_search_history::<E>(request.to_owned(), profile)).unchanged()
        }
        Msg::Internal(Internal::SearchHistoryStorageResult(request, ..))
        | Msg::Internal(Internal::SearchHistoryAPIResult(request, ..))
        | Msg::Internal(Internal::SearchHistoryStoragePatched(request)) => {
            tracing::debug!("Dropped stale search history result: {:?}", request);
            Effects::none().unchanged()
        }
        Msg::Internal(Internal::SearchHistoryMigrated(request, migrated)) => {
            let migrated_effects = Effects::msg(Msg::Event(Event::SearchHistoryMigratedToAPI {
                uid: request.uid.to_owned(),
                queries: migrated
                    .iter()
                    .map(|entry| entry.query.to_owned())
                    .collect(),
            }))
            .unchanged();
            if *status == SearchHistoryStatus::Migrating(request.to_owned()) {
                migrated_effects.join(load_search_history::<E>(status, generation, profile, false))
            } else {
                migrated_effects
            }
        }
        Msg::Internal(Internal::SearchHistoryItemPushResult(
            loading_auth_key,
            entry,
            result,
        )) if Some(loading_auth_key) == profile.auth_key() => match result {
            Ok(()) => Effects::msg(Msg::Event(Event::SearchHistoryItemAdded {
                query: entry.query.to_owned(),
                r#type: entry.r#type,
            }))
            .unchanged()
            .join(reload_search_history::<E>(status, generation, profile)),
            Err(error) => {
                tracing::warn!(
                    "Failed to push search history item to API, keeping it local: {}",
                    error
                );
                let local = entry.to_owned().into_local();
                search_history.upsert(local.to_owned(), SEARCH_HISTORY_MERGED_CAP);
                Effects::none()
                    .join(persist_local_change::<E, _>(
                        status,
                        generation,
                        profile,
                        move |search_history| {
                            search_history.upsert(local, SEARCH_HISTORY_LOCAL_CAP)
                        },
                    ))
                    .join(
                        Effects::msg(Msg::Event(Event::Error {
                            error: error.to_owned(),
                            source: Box::new(Event::SearchHistoryItemAdded {
                                query: entry.query.to_owned(),
                                r#type: entry.r#type,
                            }),
                        }))
                        .unchanged(),
                    )
            }
        },
        Msg::Internal(Internal::SearchHistoryItemDeleteResult(loading_auth_key, operation, result))
            if Some(loading_auth_key) == profile.auth_key() =>
        {
            let removed_events = operation
                .applied
                .entries()
                .iter()
                .map(|entry| Event::SearchHistoryItemRemoved {
                    query: entry.query.to_owned(),
                    r#type: entry.r#type,
                })
                .collect::<Vec<_>>();
            match result {
                Ok(()) => Effects::msgs(removed_events.into_iter().map(Msg::Event).collect())
                    .unchanged(),
                Err(error) => {
                    tracing::warn!("Failed to delete search history item from API: {}", error);
                    operation.rollback(search_history);
                    Effects::none().join(
                        Effects::msgs(
                            removed_events
                                .into_iter()
                                .map(|event| {
                                    Msg::Event(Event::Error {
                                        error: error.to_owned(),
                                        source: Box::new(event),
                                    })
                                })
                                .collect(),
                        )
                        .unchanged(),
                    )
                }
            }
        }
        Msg::Internal(Internal::SearchHistoryClearResult(loading_auth_key, operation, result))
            if Some(loading_auth_key) == profile.auth_key() =>
        {
            let cleared_event = Event::SearchHistoryCleared {
                uid: search_history.uid.to_owned(),
            };
            match result {
                Ok(()) => Effects::msg(Msg::Event(cleared_event)).unchanged(),
                Err(error) => {
                    tracing::warn!("Failed to clear search history from API: {}", error);
                    operation.rollback(search_history);
                    Effects::none().join(
                        Effects::msg(Msg::Event(Event::Error {
                            error: error.to_owned(),
                            source: Box::new(cleared_event),
                        }))
                        .unchanged(),
                    )
                }
            }
        }
        Msg::Internal(Internal::SearchHistoryChanged(persisted)) if !persisted => {
            Effects::one(push_search_history_to_storage::<E>(search_history)).unchanged()
        }
        _ => Effects::none().unchanged(),
    }
}

fn next_load_request(
    generation: &mut u64,
    profile: &Profile,
    migrate_local: bool,
) -> SearchHistoryLoadRequest {
    *generation += 1;
    SearchHistoryLoadRequest {
        uid: profile.uid(),
        generation: *generation,
        migrate_local,
    }
}

/// Starts a new load, superseding any load in flight.
fn load_search_history<E: Env + 'static>(
    status: &mut SearchHistoryStatus,
    generation: &mut u64,
    profile: &Profile,
    migrate_local: bool,
) -> Effects {
    let request = next_load_request(generation, profile, migrate_local);
    *status = SearchHistoryStatus::Loading(request.to_owned());
    Effects::one(pull_search_history::<E>(request, profile)).unchanged()
}

/// Like [`load_search_history`] but defers to a running migration,
/// which reloads once it is done.
fn reload_search_history<E: Env + 'static>(
    status: &mut SearchHistoryStatus,
    generation: &mut u64,
    profile: &Profile,
) -> Effects {
    match status {
        SearchHistoryStatus::Migrating(_) => Effects::none().unchanged(),
        _ => load_search_history::<E>(status, generation, profile, true),
    }
}

/// Persists a change that was already applied to the in-memory local entries.
///
/// Outside of `Ready` the in-memory list is not the whole local history, so `change`
/// is applied on top of the stored entries instead. A load in flight is restarted
/// once the write is done.
fn persist_local_change<E: Env + 'static, F>(
    status: &mut SearchHistoryStatus,
    generation: &mut u64,
    profile: &Profile,
    change: F,
) -> Effects
where
    F: FnOnce(&mut SearchHistoryBucket) + ConditionalSend + 'static,
{
    match status {
        SearchHistoryStatus::Loading(loading) => {
            let migrate_local = loading.migrate_local;
            let request = next_load_request(generation, profile, migrate_local);
            *status = SearchHistoryStatus::Loading(request.to_owned());
            Effects::one(
                EffectFuture::Sequential(
                    patch_search_history_storage::<E, _>(change)
                        .map(move |result| {
                            if let Err(error) = result {
                                tracing::warn!("Failed to patch search history storage: {}", error);
                            }
                            Msg::Internal(Internal::SearchHistoryStoragePatched(request))
                        })
                        .boxed_env(),
                )
                .into(),
            )
            .unchanged()
        }
        SearchHistoryStatus::Migrating(_) => {
            let uid = profile.uid();
            Effects::one(
                EffectFuture::Sequential(
                    patch_search_history_storage::<E, _>(change)
                        .map(move |result| match result {
                            Ok(()) => Msg::Event(Event::SearchHistoryPushedToStorage { uid }),
                            Err(error) => Msg::Event(Event::Error {
                                error: CtxError::from(error),
                                source: Box::new(Event::SearchHistoryPushedToStorage { uid }),
                            }),
                        })
                        .boxed_env(),
                )
                .into(),
            )
            .unchanged()
        }
        SearchHistoryStatus::Ready => {
            Effects::msg(Msg::Internal(Internal::SearchHistoryChanged(false))).unchanged()
        }
    }
}

/// Storage is read when the future is first polled, after any write queued before it.
fn read_search_history_from_storage<E: Env + 'static>(
) -> EnvFuture<'static, Vec<RecentSearchEntry>> {
    future::lazy(|_| E::get_storage::<Vec<RecentSearchEntry>>(RECENT_SEARCHES_STORAGE_KEY))
        .flatten()
        .map(|result| match result {
            Ok(Some(items)) => items
                .into_iter()
                .map(RecentSearchEntry::into_local)
                .collect(),
            Ok(None) => vec![],
            Err(error) => {
                tracing::warn!("Failed to read search history from storage: {}", error);
                vec![]
            }
        })
        .boxed_env()
}

fn write_search_history_to_storage<E: Env + 'static>(
    items: Vec<RecentSearchEntry>,
) -> TryEnvFuture<()> {
    if items.is_empty() {
        E::set_storage::<Vec<RecentSearchEntry>>(RECENT_SEARCHES_STORAGE_KEY, None)
    } else {
        E::set_storage(RECENT_SEARCHES_STORAGE_KEY, Some(&items))
    }
}

/// Reads the stored entries, applies `change` and writes the result back.
fn patch_search_history_storage<E: Env + 'static, F>(change: F) -> TryEnvFuture<()>
where
    F: FnOnce(&mut SearchHistoryBucket) + ConditionalSend + 'static,
{
    read_search_history_from_storage::<E>()
        .then(move |local| {
            let mut search_history =
                SearchHistoryBucket::new(None, local, SEARCH_HISTORY_LOCAL_CAP);
            change(&mut search_history);
            write_search_history_to_storage::<E>(search_history.local_items())
        })
        .boxed_env()
}

fn fetch_search_history_api<
    E: Env + 'static,
    RESP: for<'de> Deserialize<'de> + ConditionalSend + 'static,
>(
    request: SearchHistoryRequest,
) -> EnvFuture<'static, Result<Option<RESP>, CtxError>> {
    fetch_api::<E, Option<SearchHistoryItemRequest>, _, RESP>(request)
        .map_err(CtxError::from)
        .and_then(|response| future::ready(response.into_result().map_err(CtxError::from)))
        .boxed_env()
}

/// For requests whose response carries nothing but the `success` flag.
fn send_search_history_request<E: Env + 'static>(
    request: SearchHistoryRequest,
) -> EnvFuture<'static, Result<(), CtxError>> {
    fetch_api::<E, Option<SearchHistoryItemRequest>, _, _>(request)
        .map_err(CtxError::from)
        .and_then(|response: SuccessResponse| {
            future::ready(response.into_result().map(|_| ()).map_err(CtxError::from))
        })
        .boxed_env()
}

fn pull_search_history<E: Env + 'static>(
    request: SearchHistoryLoadRequest,
    profile: &Profile,
) -> Effect {
    match profile.auth_key() {
        Some(auth_key) => pull_search_history_from_api::<E>(request, auth_key),
        None => pull_search_history_from_storage::<E>(request),
    }
}

fn pull_search_history_from_storage<E: Env + 'static>(request: SearchHistoryLoadRequest) -> Effect {
    EffectFuture::Concurrent(
        read_search_history_from_storage::<E>()
            .map(move |local| Msg::Internal(Internal::SearchHistoryStorageResult(request, local)))
            .boxed_env(),
    )
    .into()
}

fn pull_search_history_from_api<E: Env + 'static>(
    request: SearchHistoryLoadRequest,
    auth_key: &AuthKey,
) -> Effect {
    EffectFuture::Concurrent(
        future::join(
            read_search_history_from_storage::<E>(),
            fetch_search_history_api::<E, Vec<SearchHistoryItemResponse>>(
                SearchHistoryRequest::Get {
                    auth_key: auth_key.to_owned(),
                },
            )
            .map_ok(|items| {
                items
                    .unwrap_or_default()
                    .into_iter()
                    .map(RecentSearchEntry::from)
                    .collect::<Vec<_>>()
            }),
        )
        .map(move |(local, result)| {
            Msg::Internal(Internal::SearchHistoryAPIResult(request, local, result))
        })
        .boxed_env(),
    )
    .into()
}

fn push_item_to_api<E: Env + 'static>(entry: RecentSearchEntry, auth_key: &AuthKey) -> Effect {
    let request = SearchHistoryRequest::Add {
        auth_key: auth_key.to_owned(),
        item: SearchHistoryItemRequest {
            query: entry.query.to_owned(),
            r#type: entry.r#type,
        },
    };
    EffectFuture::Concurrent(
        send_search_history_request::<E>(request)
            .map(enclose!((auth_key.to_owned() => auth_key) move |result| {
                Msg::Internal(Internal::SearchHistoryItemPushResult(auth_key, entry, result))
            }))
            .boxed_env(),
    )
    .into()
}

/// Pushes every local entry to the API, then removes the pushed ones from storage.
///
/// Entries that failed to push stay in storage for a later load. Entries written to
/// storage meanwhile are kept as well.
fn migrate_items_to_api<E: Env + 'static>(
    request: SearchHistoryLoadRequest,
    local: Vec<RecentSearchEntry>,
    auth_key: &AuthKey,
) -> Effect {
    let requests = local
        .into_iter()
        .map(|entry| {
            send_search_history_request::<E>(SearchHistoryRequest::Add {
                auth_key: auth_key.to_owned(),
                item: SearchHistoryItemRequest {
                    query: entry.query.to_owned(),
                    r#type: entry.r#type,
                },
            })
            .map(move |result| match result {
                Ok(()) => Some(entry),
                Err(error) => {
                    tracing::warn!(
                        "Failed to migrate search history item {:?}: {}",
                        entry.query,
                        error
                    );
                    None
                }
            })
        })
        .collect::<Vec<_>>();
    tracing::trace!("Migrating {} search history items to API", requests.len());
    EffectFuture::Sequential(
        future::join_all(requests)
            .then(move |results| {
                let migrated = results.into_iter().flatten().collect::<Vec<_>>();
                let keys = migrated
                    .iter()
                    .map(RecentSearchEntry::key)
                    .collect::<HashSet<_>>();
                patch_search_history_storage::<E, _>(move |search_history| {
                    search_history
                        .items
                        .retain(|entry| !keys.contains(&entry.key()))
                })
                .map(move |result| {
                    if let Err(error) = result {
                        tracing::warn!(
                            "Failed to remove migrated search history from storage: {}",
                            error
                        );
                    }
                    Msg::Internal(Internal::SearchHistoryMigrated(request, migrated))
                })
            })
            .boxed_env(),
    )
    .into()
}

fn delete_item_from_api<E: Env + 'static>(
    id: &str,
    operation: SearchHistoryPendingOperation,
    auth_key: &AuthKey,
) -> Effect {
    EffectFuture::Concurrent(
        send_search_history_request::<E>(SearchHistoryRequest::Delete {
            auth_key: auth_key.to_owned(),
            id: id.to_owned(),
        })
        .map(enclose!((auth_key.to_owned() => auth_key) move |result| {
            Msg::Internal(Internal::SearchHistoryItemDeleteResult(auth_key, operation, result))
        }))
        .boxed_env(),
    )
    .into()
}

fn clear_api<E: Env + 'static>(
    operation: SearchHistoryPendingOperation,
    auth_key: &AuthKey,
) -> Effect {
    EffectFuture::Concurrent(
        send_search_history_request::<E>(SearchHistoryRequest::Clear {
            auth_key: auth_key.to_owned(),
        })
        .map(enclose!((auth_key.to_owned() => auth_key) move |result| {
            Msg::Internal(Internal::SearchHistoryClearResult(auth_key, operation, result))
        }))
        .boxed_env(),
    )
    .into()
}

fn push_search_history_to_storage<E: Env + 'static>(
    search_history: &SearchHistoryBucket,
) -> Effect {
    let uid = search_history.uid.to_owned();
    EffectFuture::Sequential(
        write_search_history_to_storage::<E>(search_history.local_items())
            .map(move |result| match result {
                Ok(_) => Msg::Event(Event::SearchHistoryPushedToStorage { uid }),
                Err(error) => Msg::Event(Event::Error {
                    error: CtxError::from(error),
                    source: Box::new(Event::SearchHistoryPushedToStorage { uid }),
                }),
            })
            .boxed_env(),
    )
    .into()
}
