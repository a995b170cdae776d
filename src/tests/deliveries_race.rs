use axum::http::StatusCode;
use tower::ServiceExt;

use crate::tests::helper;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delivery_racing_drivers() {
    let mut app = helper::setup_test_app().await;

    let sender = helper::login("sender", None);
    let receiver = helper::login("receiver", None);

    let delivery = helper::create_delivery(&mut app, &sender, "60661").await;
    helper::transition(&mut app, &receiver, &delivery.id, "acknowledge").await;

    let handles = ["driverA", "driverB"]
        .into_iter()
        .map(|driver_id| {
            let app = app.clone();
            let request = helper::transition_request(
                &helper::login(driver_id, None),
                &delivery.id,
                "accept",
                Some(driver_id),
            );

            tokio::spawn(async move {
                let response = app.oneshot(request).await.unwrap();

                helper::transition_response(response).await
            })
        })
        .collect::<Vec<_>>();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        let (status_code, delivery, _) = handle.await.unwrap();
        match status_code {
            StatusCode::OK => winners.push(delivery.unwrap()),
            StatusCode::CONFLICT => conflicts += 1,
            status_code => panic!("Unexpected status code: {status_code}"),
        }
    }

    assert_eq!(1, winners.len());
    assert_eq!(1, conflicts);

    let (_, current, _) =
        helper::single_delivery(&mut app, &sender, &delivery.id.to_string()).await;
    let current = current.unwrap();
    assert_eq!("assigned", current.status);
    assert_eq!(winners[0].assigned_driver_id, current.assigned_driver_id);
}
