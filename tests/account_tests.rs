//! Integration tests for the account service against an in-memory sqlite database.

use chrono::{Days, Local, NaiveDate};
use ftpaccounts::accounts::{Lifetime, verify_password};
use ftpaccounts::config::{AccountsConfig, DatabaseConfig, SecurityConfig};
use ftpaccounts::db::NewAccountRow;
use ftpaccounts::services::{AccountError, AccountService, ListFilter, SeaOrmAccountService};
use ftpaccounts::Store;

fn fast_hashing() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn spawn_service_with(accounts: AccountsConfig) -> SeaOrmAccountService {
    let store = Store::connect(&DatabaseConfig::sqlite_memory())
        .await
        .expect("failed to open in-memory database");
    store.init_tables().await.expect("failed to create users table");

    SeaOrmAccountService::new(store, accounts, fast_hashing())
}

async fn spawn_service() -> SeaOrmAccountService {
    spawn_service_with(AccountsConfig::default()).await
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn days_from_today(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).unwrap()
}

#[tokio::test]
async fn test_created_account_exists() {
    let service = spawn_service().await;

    assert!(!service.username_exists("carol").await.unwrap());
    service
        .create_account("carol", "pw", Some(Lifetime::Days(3)), None)
        .await
        .unwrap();
    assert!(service.username_exists("carol").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let service = spawn_service().await;

    service.create_account("dave", "pw", None, None).await.unwrap();
    let err = service
        .create_account("dave", "other", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::AlreadyExists(name) if name == "dave"));
}

fn raw_row(user: &str) -> NewAccountRow {
    NewAccountRow {
        user: user.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        uid: 1001,
        gid: 1001,
        dir: format!("/srv/ftp/{user}"),
        requested_by: None,
        requested_on: today(),
        expiration_date: days_from_today(1),
    }
}

#[tokio::test]
async fn test_duplicate_insert_is_unique_violation() {
    let service = spawn_service().await;
    let store = service.store();

    store.insert_account(raw_row("ivan")).await.unwrap();
    let err = store.insert_account(raw_row("ivan")).await.unwrap_err();

    assert!(AccountError::is_unique_violation(&err));
}

#[tokio::test]
async fn test_create_over_foreign_row_conflicts() {
    let service = spawn_service().await;

    // a row written by another tool, not through the service
    service.store().insert_account(raw_row("judy")).await.unwrap();

    let err = service
        .create_account("judy", "pw", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::AlreadyExists(name) if name == "judy"));
}

#[tokio::test]
async fn test_create_fills_row_defaults() {
    let service = spawn_service().await;

    let account = service
        .create_account("erin", "pw", None, Some("ops@example.com"))
        .await
        .unwrap();

    assert_eq!(account.dir, "/srv/ftp/erin");
    assert_eq!(account.uid, 1001);
    assert_eq!(account.gid, 1001);
    assert!(account.active);
    assert_eq!(account.requested_on, today());
    assert_eq!(account.expiration_date, days_from_today(8));
    assert_eq!(account.renewed_on, None);
    assert_eq!(account.renew_counter, 0);
    assert_eq!(account.requested_by.as_deref(), Some("ops@example.com"));
}

#[tokio::test]
async fn test_create_honours_configured_defaults() {
    let service = spawn_service_with(AccountsConfig {
        default_lifetime_days: 14,
        base_directory: "/data/ftp/".to_string(),
        uid: 2000,
        gid: 2001,
        ..AccountsConfig::default()
    })
    .await;

    let account = service.create_account("frank", "pw", None, None).await.unwrap();

    assert_eq!(account.dir, "/data/ftp/frank");
    assert_eq!((account.uid, account.gid), (2000, 2001));
    assert_eq!(account.expiration_date, days_from_today(15));
}

#[tokio::test]
async fn test_zero_day_lifetime_is_rejected() {
    let service = spawn_service().await;

    let err = service
        .create_account("gina", "pw", Some(Lifetime::Days(0)), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::InvalidLifetime(_)));
    assert!(!service.username_exists("gina").await.unwrap());
}

#[tokio::test]
async fn test_create_with_explicit_date() {
    let service = spawn_service().await;

    let lifetime = Lifetime::parse("2031-05-17").unwrap();
    let account = service
        .create_account("hank", "pw", Some(lifetime), None)
        .await
        .unwrap();

    assert_eq!(
        account.expiration_date,
        NaiveDate::from_ymd_opt(2031, 5, 17).unwrap()
    );
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let service = spawn_service().await;

    service.create_account("ivy", "secret", None, None).await.unwrap();
    let row = service
        .store()
        .get_account("ivy")
        .await
        .unwrap()
        .expect("row should exist");

    assert_ne!(row.password, "secret");
    assert!(row.password.starts_with("$argon2id$"));
    assert!(verify_password("secret", &row.password).unwrap());
}

#[tokio::test]
async fn test_missing_arguments_are_rejected() {
    let service = spawn_service().await;

    assert!(matches!(
        service.create_account("", "pw", None, None).await,
        Err(AccountError::MissingArgument("username"))
    ));
    assert!(matches!(
        service.create_account("jack", "", None, None).await,
        Err(AccountError::MissingArgument("password"))
    ));
    assert!(matches!(
        service.username_exists("").await,
        Err(AccountError::MissingArgument(_))
    ));
    assert!(matches!(
        service.get_requester("").await,
        Err(AccountError::MissingArgument(_))
    ));
    assert!(matches!(
        service.renew_account("jack", Lifetime::Days(0)).await,
        Err(AccountError::MissingArgument("lifetime"))
    ));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let service = spawn_service().await;

    assert!(matches!(
        service.is_account_expired("nobody").await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        service.is_account_deactivated("nobody").await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        service.deactivate_account("nobody").await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        service.activate_account("nobody").await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        service.renew_account("nobody", Lifetime::Days(5)).await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        service.get_account("nobody").await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deactivate_keeps_expiration_date() {
    let service = spawn_service().await;

    let created = service.create_account("kim", "pw", None, None).await.unwrap();
    assert!(service.deactivate_account("kim").await.unwrap());

    let account = service.get_account("kim").await.unwrap();
    assert!(!account.active);
    assert_eq!(account.expiration_date, created.expiration_date);

    assert!(!service.activate_account("kim").await.unwrap());
    assert!(!service.is_account_deactivated("kim").await.unwrap());
}

#[tokio::test]
async fn test_deactivation_is_per_user() {
    let service = spawn_service().await;

    service.create_account("lena", "pw", None, None).await.unwrap();
    service.create_account("mike", "pw", None, None).await.unwrap();
    service.deactivate_account("lena").await.unwrap();

    assert!(service.is_account_deactivated("lena").await.unwrap());
    assert!(!service.is_account_deactivated("mike").await.unwrap());
}

#[tokio::test]
async fn test_expiration_follows_the_date() {
    let service = spawn_service().await;

    let yesterday = today().pred_opt().unwrap();
    service
        .create_account("nina", "pw", Some(Lifetime::Until(yesterday)), None)
        .await
        .unwrap();
    service
        .create_account("otto", "pw", Some(Lifetime::Until(today())), None)
        .await
        .unwrap();

    assert!(service.is_account_expired("nina").await.unwrap());
    // still usable on its last day
    assert!(!service.is_account_expired("otto").await.unwrap());
    // expiry does not touch the flag
    assert!(!service.is_account_deactivated("nina").await.unwrap());
}

#[tokio::test]
async fn test_renew_reactivates_and_counts() {
    let service = spawn_service().await;

    service.create_account("paul", "pw", None, None).await.unwrap();
    service.deactivate_account("paul").await.unwrap();

    let renewed = service
        .renew_account("paul", Lifetime::Days(10))
        .await
        .unwrap();

    assert!(renewed.active);
    assert!(!service.is_account_deactivated("paul").await.unwrap());
    assert_eq!(renewed.renew_counter, 1);
    assert_eq!(renewed.renewed_on, Some(today()));
    assert_eq!(renewed.expiration_date, days_from_today(11));

    let renewed = service
        .renew_account("paul", Lifetime::parse("2032-02-29").unwrap())
        .await
        .unwrap();
    assert_eq!(renewed.renew_counter, 2);
    assert_eq!(
        renewed.expiration_date,
        NaiveDate::from_ymd_opt(2032, 2, 29).unwrap()
    );
}

#[tokio::test]
async fn test_renew_can_refuse_deactivated_accounts() {
    let service = spawn_service_with(AccountsConfig {
        reactivate_on_renew: false,
        ..AccountsConfig::default()
    })
    .await;

    let created = service.create_account("quinn", "pw", None, None).await.unwrap();
    service.deactivate_account("quinn").await.unwrap();

    let err = service
        .renew_account("quinn", Lifetime::Days(30))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Deactivated(_)));

    let account = service.get_account("quinn").await.unwrap();
    assert!(!account.active);
    assert_eq!(account.renew_counter, 0);
    assert_eq!(account.expiration_date, created.expiration_date);

    // active accounts still renew normally
    service.activate_account("quinn").await.unwrap();
    let renewed = service.renew_account("quinn", Lifetime::Days(30)).await.unwrap();
    assert_eq!(renewed.renew_counter, 1);
}

#[tokio::test]
async fn test_list_filters() {
    let service = spawn_service().await;

    assert!(service.list_accounts(ListFilter::All).await.unwrap().is_empty());

    for name in ["uma", "rita", "sam", "tom"] {
        service.create_account(name, "pw", None, None).await.unwrap();
    }
    service.deactivate_account("sam").await.unwrap();
    service.deactivate_account("rita").await.unwrap();

    let names = |accounts: Vec<ftpaccounts::services::AccountSummary>| {
        accounts.into_iter().map(|a| a.user).collect::<Vec<_>>()
    };

    assert_eq!(
        names(service.list_accounts(ListFilter::Active).await.unwrap()),
        ["tom", "uma"]
    );
    assert_eq!(
        names(service.list_accounts(ListFilter::Expired).await.unwrap()),
        ["rita", "sam"]
    );
    assert_eq!(
        names(service.list_accounts(ListFilter::All).await.unwrap()),
        ["rita", "sam", "tom", "uma"]
    );
}

#[tokio::test]
async fn test_get_requester() {
    let service = spawn_service().await;

    service
        .create_account("vera", "pw", None, Some("helpdesk"))
        .await
        .unwrap();
    service.create_account("walt", "pw", None, None).await.unwrap();

    let requester = service.get_requester("vera").await.unwrap().unwrap();
    assert_eq!(requester.requested_by.as_deref(), Some("helpdesk"));
    assert_eq!(requester.requested_on, today());

    let requester = service.get_requester("walt").await.unwrap().unwrap();
    assert_eq!(requester.requested_by, None);

    assert!(service.get_requester("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_expiring() {
    let service = spawn_service().await;

    let yesterday = today().pred_opt().unwrap();
    service
        .create_account("xena", "pw", Some(Lifetime::Until(days_from_today(2))), None)
        .await
        .unwrap();
    service
        .create_account("yves", "pw", Some(Lifetime::Until(today())), None)
        .await
        .unwrap();
    service
        .create_account("zoe", "pw", Some(Lifetime::Until(days_from_today(20))), None)
        .await
        .unwrap();
    service
        .create_account("abe", "pw", Some(Lifetime::Until(yesterday)), None)
        .await
        .unwrap();
    service
        .create_account("bea", "pw", Some(Lifetime::Until(days_from_today(1))), None)
        .await
        .unwrap();
    service.deactivate_account("bea").await.unwrap();

    let expiring: Vec<_> = service
        .list_expiring(3)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.user)
        .collect();

    assert_eq!(expiring, ["yves", "xena"]);
}

#[tokio::test]
async fn test_alice_lifecycle() {
    let service = spawn_service().await;

    let alice = service
        .create_account("alice", "secret", None, None)
        .await
        .unwrap();
    assert!(alice.active);
    assert_eq!(alice.requested_by, None);
    assert_eq!(alice.expiration_date, days_from_today(8));

    service.deactivate_account("alice").await.unwrap();
    assert!(service.is_account_deactivated("alice").await.unwrap());

    service
        .renew_account("alice", Lifetime::Days(30))
        .await
        .unwrap();
    assert!(!service.is_account_deactivated("alice").await.unwrap());

    let alice = service.get_account("alice").await.unwrap();
    assert_eq!(alice.renew_counter, 1);
    assert_eq!(alice.expiration_date, days_from_today(31));

    service.into_store().close().await;
}
