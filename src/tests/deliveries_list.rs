use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_delivery_list_community_scoping() {
    let mut app = helper::setup_test_app().await;

    let sender = helper::login("sender", None);
    let receiver = helper::login("receiver", None);
    let driver = helper::login("driverA", None);

    let chicago = helper::create_delivery(&mut app, &sender, "60661").await;
    let baltimore = helper::create_delivery(&mut app, &sender, "21201").await;

    helper::transition(&mut app, &receiver, &chicago.id, "acknowledge").await;
    helper::transition(&mut app, &receiver, &baltimore.id, "acknowledge").await;

    let chicago_only =
        helper::list_delivery_ids(&mut app, &driver, "role=driver&communityId=60661").await;
    assert_eq!(vec![chicago.id], chicago_only);

    let baltimore_only =
        helper::list_delivery_ids(&mut app, &receiver, "role=receiver&communityId=21201").await;
    assert_eq!(vec![baltimore.id], baltimore_only);

    // without a community everything is visible
    let everywhere = helper::list_delivery_ids(&mut app, &driver, "role=driver").await;
    assert_eq!(2, everywhere.len());
    assert!(everywhere.contains(&chicago.id));
    assert!(everywhere.contains(&baltimore.id));

    // senders are not scoped by community
    let sent = helper::list_delivery_ids(&mut app, &sender, "role=sender&communityId=60661").await;
    assert_eq!(2, sent.len());
}

#[tokio::test]
async fn test_delivery_list_community_from_token() {
    let mut app = helper::setup_test_app().await;

    let sender = helper::login("sender", None);
    let receiver = helper::login("receiver", Some("60661"));
    let driver = helper::login("driverA", Some("21201"));

    let chicago = helper::create_delivery(&mut app, &sender, "60661").await;
    helper::create_delivery(&mut app, &sender, "21201").await;

    let receiving = helper::list_delivery_ids(&mut app, &receiver, "role=receiver").await;
    assert_eq!(vec![chicago.id], receiving);

    // an explicit community wins over the one of the token
    helper::transition(&mut app, &receiver, &chicago.id, "acknowledge").await;
    let elsewhere =
        helper::list_delivery_ids(&mut app, &driver, "role=driver&communityId=60661").await;
    assert_eq!(vec![chicago.id], elsewhere);

    let home = helper::list_delivery_ids(&mut app, &driver, "role=driver").await;
    assert!(home.is_empty());
}

#[tokio::test]
async fn test_delivery_list_sender_sees_only_own() {
    let mut app = helper::setup_test_app().await;

    let sender_one = helper::login("sender-one", None);
    let sender_two = helper::login("sender-two", None);

    let first = helper::create_delivery(&mut app, &sender_one, "60661").await;
    let second = helper::create_delivery(&mut app, &sender_two, "60661").await;

    let one = helper::list_delivery_ids(&mut app, &sender_one, "role=sender").await;
    assert_eq!(vec![first.id], one);

    let two = helper::list_delivery_ids(&mut app, &sender_two, "role=sender").await;
    assert_eq!(vec![second.id], two);
}

#[tokio::test]
async fn test_delivery_list_invalid_role() {
    let mut app = helper::setup_test_app().await;

    let sender = helper::login("sender", None);

    let (status_code, _, error) = helper::list_deliveries(&mut app, &sender, "role=admin").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid query parameter", error.unwrap().error);

    let (status_code, _, error) = helper::list_deliveries(&mut app, &sender, "").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid query parameter", error.unwrap().error);
}
