//! Same flows against Postgres
//!
//! Run with a database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use axum::http::StatusCode;
use tower::ServiceExt;

use crate::tests::helper;

#[sqlx::test]
#[ignore = "needs a Postgres database"]
async fn test_postgres_delivery_lifecycle(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app_with_pool(pool).await;

    let sender = helper::login("sender", None);
    let receiver = helper::login("receiver", Some("60661"));
    let driver_a = helper::login("driverA", Some("60661"));
    let driver_b = helper::login("driverB", Some("60661"));

    let delivery = helper::create_delivery(&mut app, &sender, "60661").await;
    helper::create_delivery(&mut app, &sender, "21201").await;

    let receiving = helper::list_delivery_ids(&mut app, &receiver, "role=receiver").await;
    assert_eq!(vec![delivery.id], receiving);

    helper::transition(&mut app, &receiver, &delivery.id, "acknowledge").await;

    let waiting = helper::list_delivery_ids(&mut app, &driver_b, "role=driver").await;
    assert_eq!(vec![delivery.id], waiting);

    helper::transition(&mut app, &driver_a, &delivery.id, "accept").await;

    let (status_code, _, _) =
        helper::maybe_transition(&mut app, &driver_b, &delivery.id, "accept", None).await;
    assert_eq!(StatusCode::CONFLICT, status_code);

    let theirs = helper::list_delivery_ids(&mut app, &driver_b, "role=driver").await;
    assert!(theirs.is_empty());

    let (status_code, _, _) =
        helper::maybe_transition(&mut app, &driver_b, &delivery.id, "deliver", None).await;
    assert_eq!(StatusCode::CONFLICT, status_code);

    helper::transition(&mut app, &driver_a, &delivery.id, "deliver").await;
    helper::transition(&mut app, &receiver, &delivery.id, "confirm").await;

    let retried = helper::transition(&mut app, &receiver, &delivery.id, "confirm").await;
    assert_eq!("completed", retried.status);
    assert_eq!(Some("driverA".to_string()), retried.assigned_driver_id);

    let sent = helper::list_delivery_ids(&mut app, &sender, "role=sender").await;
    assert_eq!(2, sent.len());
}

#[sqlx::test]
#[ignore = "needs a Postgres database"]
async fn test_postgres_racing_drivers(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app_with_pool(pool).await;

    let sender = helper::login("sender", None);
    let receiver = helper::login("receiver", None);

    let delivery = helper::create_delivery(&mut app, &sender, "60661").await;
    helper::transition(&mut app, &receiver, &delivery.id, "acknowledge").await;

    let handles = (0..4)
        .map(|driver| {
            let app = app.clone();
            let driver_id = format!("driver-{driver}");
            let request = helper::transition_request(
                &helper::login(&driver_id, None),
                &delivery.id,
                "accept",
                None,
            );

            tokio::spawn(async move {
                let response = app.oneshot(request).await.unwrap();

                helper::transition_response(response).await.0
            })
        })
        .collect::<Vec<_>>();

    let mut status_codes = Vec::new();
    for handle in handles {
        status_codes.push(handle.await.unwrap());
    }

    assert_eq!(
        1,
        status_codes
            .iter()
            .filter(|status_code| **status_code == StatusCode::OK)
            .count()
    );
    assert_eq!(
        3,
        status_codes
            .iter()
            .filter(|status_code| **status_code == StatusCode::CONFLICT)
            .count()
    );
}
