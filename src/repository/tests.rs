//! Repository Integration Tests
//!
//! Migration behaviour against both storage backends, and the PostgREST
//! gateway against a local HTTP server.

#[cfg(test)]
mod tests {
    use crate::config::RemoteConfig;
    use crate::domain::{Identity, MeasurementMode, PersistedAppState, UserIdentity};
    use crate::repository::{
        IdentityKeyResolver, KeyValueStore, LocalStateStore, MemoryKeyValueStore,
        MigrationOutcome, RemoteError, RemoteStateGateway, Slice, SqliteKeyValueStore,
        SupabaseGateway,
    };
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;
    use tempfile::tempdir;

    fn seed(store: &dyn KeyValueStore, keys: &crate::repository::StorageKeys, slice: Slice, raw: &str) {
        store.set(keys.key(slice), raw).expect("Failed to seed");
    }

    #[test]
    fn test_second_resolution_leaves_migrated_data_alone() {
        let store = MemoryKeyValueStore::new();
        let resolver = IdentityKeyResolver::default();
        seed(&store, &resolver.guest_keys(), Slice::Essentials, r#"["두부"]"#);
        let user = Identity::user("u-1");

        let first = resolver.resolve(&user, &store).expect("First resolve failed");
        let after_first = store.get(first.keys.key(Slice::Essentials)).unwrap();

        // The user edits their list; a later guest change must not leak in.
        store.set(first.keys.key(Slice::Essentials), r#"["두부","김치"]"#).unwrap();
        seed(&store, &resolver.guest_keys(), Slice::Essentials, r#"["라면"]"#);

        let second = resolver.resolve(&user, &store).expect("Second resolve failed");

        assert_eq!(first.outcome, MigrationOutcome::FromGuest(vec![Slice::Essentials]));
        assert_eq!(after_first.as_deref(), Some(r#"["두부"]"#));
        assert_eq!(second.outcome, MigrationOutcome::AlreadyPresent);
        assert_eq!(
            store.get(second.keys.key(Slice::Essentials)).unwrap().as_deref(),
            Some(r#"["두부","김치"]"#)
        );
    }

    #[test]
    fn test_guest_data_wins_over_legacy_without_interleaving() {
        let store = MemoryKeyValueStore::new();
        let resolver = IdentityKeyResolver::default();
        seed(&store, &resolver.guest_keys(), Slice::Essentials, r#"["두부"]"#);
        seed(&store, &resolver.legacy_keys(), Slice::Essentials, r#"["김치"]"#);
        seed(&store, &resolver.legacy_keys(), Slice::Mode, r#""precise""#);

        let resolution = resolver.resolve(&Identity::user("u-1"), &store).unwrap();

        assert_eq!(resolution.outcome, MigrationOutcome::FromGuest(vec![Slice::Essentials]));
        let local = LocalStateStore::new(store.clone());
        let state = local.load_state(&resolution.keys);
        assert_eq!(state.essential_names, vec!["두부".to_string()]);
        assert_eq!(state.measurement_mode, MeasurementMode::Simple);
    }

    #[test]
    fn test_legacy_data_is_claimed_when_guest_is_empty() {
        let store = MemoryKeyValueStore::new();
        let resolver = IdentityKeyResolver::default();
        seed(&store, &resolver.legacy_keys(), Slice::Mode, r#""precise""#);

        let resolution = resolver.resolve(&Identity::user("u-1"), &store).unwrap();

        assert_eq!(resolution.outcome, MigrationOutcome::FromLegacy(vec![Slice::Mode]));
        // Source keys stay in place
        assert!(store.contains(resolver.legacy_keys().key(Slice::Mode)).unwrap());
        let state = LocalStateStore::new(store).load_state(&resolution.keys);
        assert_eq!(state.measurement_mode, MeasurementMode::Precise);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("fridge.db");
        let resolver = IdentityKeyResolver::default();
        let keys = resolver.keys_for(&Identity::Guest);

        {
            let local = LocalStateStore::new(SqliteKeyValueStore::open(&db_path).unwrap());
            let mut state = PersistedAppState::default();
            state.measurement_mode = MeasurementMode::Precise;
            local.write_slice(&keys, Slice::Mode, &state).unwrap();
        }

        let reopened = LocalStateStore::new(SqliteKeyValueStore::open(&db_path).unwrap());
        assert_eq!(reopened.load_state(&keys).measurement_mode, MeasurementMode::Precise);
    }

    #[test]
    fn test_sqlite_set_replaces_and_remove_deletes() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));

        store.remove("k").unwrap();
        assert!(!store.contains("k").unwrap());
    }

    #[test]
    fn test_sqlite_stamps_updated_at_on_write() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fridge.db");
        SqliteKeyValueStore::open(&db_path).unwrap().set("k", "1").unwrap();

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let updated_at: i64 = conn
            .query_row("SELECT updated_at FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert!(updated_at > 0);
    }

    fn gateway(server: &Server) -> SupabaseGateway {
        let url = server.url_str("/");
        SupabaseGateway::new(&RemoteConfig::new(url, "anon-key")).expect("Failed to build gateway")
    }

    #[tokio::test]
    async fn test_gateway_load_returns_payload() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/rest/v1/fridge_app_state"),
                request::query(url_decoded(contains(("user_id", "eq.u-1")))),
                request::headers(contains(("apikey", "anon-key"))),
                request::headers(contains(("authorization", "Bearer user-token"))),
            ])
            .respond_with(json_encoded(json!([{ "payload": { "measurementMode": "precise" } }]))),
        );

        let user = UserIdentity::new("u-1").with_token("user-token");
        let payload = gateway(&server).load(&user).await.unwrap();

        assert_eq!(payload, Some(json!({ "measurementMode": "precise" })));
    }

    #[tokio::test]
    async fn test_gateway_load_without_row_is_none() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/rest/v1/fridge_app_state"))
                .respond_with(json_encoded(json!([]))),
        );

        let payload = gateway(&server).load(&UserIdentity::new("u-1")).await.unwrap();
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn test_gateway_no_row_code_is_none() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/rest/v1/fridge_app_state"))
                .respond_with(
                    status_code(406)
                        .body(r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#),
                ),
        );

        let payload = gateway(&server).load(&UserIdentity::new("u-1")).await.unwrap();
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn test_gateway_missing_table_is_schema_absent() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/rest/v1/fridge_app_state"))
                .respond_with(
                    status_code(404)
                        .body(r#"{"code":"42P01","message":"relation \"public.fridge_app_state\" does not exist"}"#),
                ),
        );

        let err = gateway(&server).load(&UserIdentity::new("u-1")).await.unwrap_err();
        assert!(err.is_schema_absent(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_gateway_save_upserts_full_row() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/rest/v1/fridge_app_state"),
                request::query(url_decoded(contains(("on_conflict", "user_id")))),
                request::headers(contains(("prefer", "resolution=merge-duplicates,return=minimal"))),
                request::body(matches(r#""user_id":"u-1""#)),
                request::body(matches(r#""payload":\{"#)),
                request::body(matches(r#""updated_at":"#)),
            ])
            .respond_with(status_code(201)),
        );

        gateway(&server)
            .save(&UserIdentity::new("u-1"), &PersistedAppState::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_gateway_server_fault_is_transient() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/rest/v1/fridge_app_state"))
                .respond_with(status_code(500).body("upstream exploded")),
        );

        let err = gateway(&server)
            .save(&UserIdentity::new("u-1"), &PersistedAppState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transient(_)), "unexpected error: {err}");
    }
}
