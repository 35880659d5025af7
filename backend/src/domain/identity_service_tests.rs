//! Tests for the identity service.

use std::sync::{Arc, Mutex};

use mockall::predicate::always;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockAuthTokenRepository, MockPasswordHasher, MockUserRepository, StoredCredentials,
};
use crate::domain::{ErrorCode, TokenDigest, UserId, UserName};

type Service = IdentityService<MockUserRepository, MockAuthTokenRepository, MockPasswordHasher>;

const STORED_HASH: &str = "$argon2id$stub";

fn make_service(
    users: MockUserRepository,
    tokens: MockAuthTokenRepository,
    hasher: MockPasswordHasher,
) -> Service {
    IdentityService::new(Arc::new(users), Arc::new(tokens), Arc::new(hasher))
}

fn user(id: i64, email: &str, extra: UserExtraFields) -> User {
    User::new(
        UserId::new(id),
        EmailAddress::parse(email).expect("valid email"),
        extra,
    )
}

fn echo_insert(users: &mut MockUserRepository) {
    users
        .expect_insert()
        .times(1)
        .returning(|record| Ok(User::new(UserId::new(1), record.email.clone(), record.extra.clone())));
}

fn hasher_accepting(password: &'static str) -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .returning(move |candidate, hash| candidate == password && hash.is_usable());
    hasher
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("credentials shape")
}

fn stored(extra: UserExtraFields) -> StoredCredentials {
    StoredCredentials {
        user: user(4, "ada@example.com", extra),
        password_hash: PasswordHash::from_stored(STORED_HASH),
    }
}

#[tokio::test]
async fn create_user_hashes_password_and_normalises_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|record| {
            record.email.as_ref() == "Ada@example.com"
                && record.password_hash.as_ref() == STORED_HASH
                && record.extra.is_active
        })
        .times(1)
        .returning(|record| Ok(User::new(UserId::new(1), record.email.clone(), record.extra.clone())));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password.expose() == "testpass123")
        .times(1)
        .returning(|_| Ok(PasswordHash::from_stored(STORED_HASH)));

    let service = make_service(users, MockAuthTokenRepository::new(), hasher);
    let created = service
        .create_user(
            "Ada@EXAMPLE.com",
            Some(Password::new("testpass123").expect("password")),
            UserExtraFields::default(),
        )
        .await
        .expect("user created");

    assert_eq!(created.email().as_ref(), "Ada@example.com");
    assert!(!created.is_staff());
}

#[tokio::test]
async fn create_user_without_password_stores_unusable_hash() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|record| !record.password_hash.is_usable())
        .times(1)
        .returning(|record| Ok(User::new(UserId::new(2), record.email.clone(), record.extra.clone())));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();

    let service = make_service(users, MockAuthTokenRepository::new(), hasher);
    service
        .create_user("nopass@example.com", None, UserExtraFields::default())
        .await
        .expect("user created");
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn create_user_rejects_empty_email_without_persisting(#[case] email: &str) {
    let mut users = MockUserRepository::new();
    users.expect_insert().never();

    let service = make_service(users, MockAuthTokenRepository::new(), MockPasswordHasher::new());
    let err = service
        .create_user(email, None, UserExtraFields::default())
        .await
        .expect_err("empty email rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.details().and_then(|d| d.get("email")).is_some());
}

#[tokio::test]
async fn duplicate_email_maps_to_field_error() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .returning(|_| Err(UserPersistenceError::duplicate_email("ada@example.com")));

    let service = make_service(users, MockAuthTokenRepository::new(), MockPasswordHasher::new());
    let err = service
        .create_user("ada@example.com", None, UserExtraFields::default())
        .await
        .expect_err("duplicate rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d["email"][0].as_str()),
        Some("user with this email already exists.")
    );
}

#[tokio::test]
async fn create_superuser_sets_flags() {
    let mut users = MockUserRepository::new();
    echo_insert(&mut users);
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::from_stored(STORED_HASH)));

    let service = make_service(users, MockAuthTokenRepository::new(), hasher);
    let admin = service
        .create_superuser("admin@example.com", Password::new("adminpass").expect("pw"))
        .await
        .expect("superuser created");

    assert!(admin.is_staff());
    assert!(admin.is_superuser());
    assert!(admin.is_active());
}

#[rstest]
#[case("ada@example.com", "secret", true, true)]
#[case("ADA@EXAMPLE.COM", "secret", true, true)]
#[case("ada@example.com", "wrong", true, false)]
#[case("ada@example.com", "secret", false, false)]
#[tokio::test]
async fn authenticate_requires_active_user_and_matching_password(
    #[case] email: &str,
    #[case] password: &str,
    #[case] active: bool,
    #[case] expected: bool,
) {
    let mut users = MockUserRepository::new();
    let extra = UserExtraFields {
        is_active: active,
        ..UserExtraFields::default()
    };
    users
        .expect_find_credentials()
        .with(always())
        .returning(move |_| Ok(Some(stored(extra.clone()))));

    let service = make_service(users, MockAuthTokenRepository::new(), hasher_accepting("secret"));
    let result = service
        .authenticate(&credentials(email, password))
        .await
        .expect("lookup succeeds");

    assert_eq!(result.is_some(), expected);
}

#[tokio::test]
async fn authenticate_rejects_unknown_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_credentials().returning(|_| Ok(None));

    let service = make_service(users, MockAuthTokenRepository::new(), hasher_accepting("secret"));
    let result = service
        .authenticate(&credentials("ghost@example.com", "secret"))
        .await
        .expect("lookup succeeds");

    assert!(result.is_none());
}

#[tokio::test]
async fn issue_token_stores_only_the_digest() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .returning(|_| Ok(Some(stored(UserExtraFields::default()))));
    let captured: Arc<Mutex<Option<TokenDigest>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_replace_for_user()
        .withf(|user_id, _| *user_id == UserId::new(4))
        .times(1)
        .returning(move |_, digest| {
            *sink.lock().expect("digest lock") = Some(digest.clone());
            Ok(())
        });

    let service = make_service(users, tokens, hasher_accepting("secret"));
    let token = service
        .issue_token(&credentials("ada@example.com", "secret"))
        .await
        .expect("token issued");

    let stored_digest = captured.lock().expect("digest lock").clone();
    assert_eq!(stored_digest, Some(token.digest()));
    assert_ne!(token.digest().as_ref(), token.expose());
}

#[tokio::test]
async fn issue_token_reports_bad_credentials_under_non_field_errors() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .returning(|_| Ok(Some(stored(UserExtraFields::default()))));
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_replace_for_user().never();

    let service = make_service(users, tokens, hasher_accepting("secret"));
    let err = service
        .issue_token(&credentials("ada@example.com", "nope"))
        .await
        .expect_err("bad credentials");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details()
            .and_then(|d| d[NON_FIELD_ERRORS][0].as_str()),
        Some(BAD_CREDENTIALS_MESSAGE)
    );
}

#[rstest]
#[case(None, false)]
#[case(Some(true), true)]
#[case(Some(false), false)]
#[tokio::test]
async fn resolve_token_requires_known_token_and_active_owner(
    #[case] owner_active: Option<bool>,
    #[case] expected: bool,
) {
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_find_user()
        .returning(move |_| Ok(owner_active.map(|_| UserId::new(4))));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(move |id| {
        Ok(owner_active.map(|active| {
            let extra = UserExtraFields {
                is_active: active,
                ..UserExtraFields::default()
            };
            user(id.as_i64(), "ada@example.com", extra)
        }))
    });

    let service = make_service(users, tokens, MockPasswordHasher::new());
    let result = service.resolve_token(&AuthToken::generate()).await;

    match (expected, result) {
        (true, Ok(found)) => assert_eq!(found.id(), UserId::new(4)),
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
        (true, Err(err)) => panic!("expected success, got error: {err:?}"),
        (false, Ok(found)) => panic!("expected failure, got user {found}"),
    }
}

#[tokio::test]
async fn token_store_outage_maps_to_service_unavailable() {
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_find_user()
        .returning(|_| Err(AuthTokenPersistenceError::connection("refused")));

    let service = make_service(MockUserRepository::new(), tokens, MockPasswordHasher::new());
    let err = service
        .resolve_token(&AuthToken::generate())
        .await
        .expect_err("outage");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn update_profile_rehashes_supplied_password() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordHash::from_stored("$argon2id$new")));
    let mut users = MockUserRepository::new();
    users
        .expect_update_profile()
        .withf(|id, changes| {
            *id == UserId::new(4)
                && changes.name.as_ref().map(ToString::to_string).as_deref() == Some("Ada L")
                && changes
                    .password_hash
                    .as_ref()
                    .is_some_and(|hash| hash.as_ref() == "$argon2id$new")
        })
        .times(1)
        .returning(|id, changes| {
            let extra = UserExtraFields::named(changes.name.clone().unwrap_or_default());
            Ok(Some(user(id.as_i64(), "ada@example.com", extra)))
        });

    let service = make_service(users, MockAuthTokenRepository::new(), hasher);
    let current = user(4, "ada@example.com", UserExtraFields::default());
    let update = ProfileUpdate {
        name: Some(UserName::new("Ada L").expect("name")),
        password: Some(Password::new("newpassword").expect("pw")),
    };
    let updated = service
        .update_profile(&current, update)
        .await
        .expect("profile updated");

    assert_eq!(updated.name().as_ref(), "Ada L");
}
