//! Dispatcher tests against a scripted transport
//!
//! Time is paused: scripted reply delays run on virtual time, so arrival
//! order is decided by the delays alone.

use std::time::Duration;

use mintshop_client::state::{Food, Shop, UserInfo};
use mintshop_client::{
    getters, Action, ActionError, Api, AppState, ClientConfig, Dispatcher, Outcome,
};
use mintshop_store::testing::{MockTransport, Reply};
use mintshop_store::{async_trait, Envelope, Params, Transport, TransportError};
use mintshop_store::{assert_committed, Method, OrderingPolicy, TaskKey};
use serde_json::json;

fn dispatcher(transport: &MockTransport) -> Dispatcher<MockTransport> {
    Dispatcher::new(&ClientConfig::default(), transport.clone())
}

fn dispatcher_with(transport: &MockTransport, ordering: OrderingPolicy) -> Dispatcher<MockTransport> {
    let config = ClientConfig {
        ordering,
        ..ClientConfig::default()
    };
    Dispatcher::new(&config, transport.clone())
}

fn committed(dispatcher: &Dispatcher<MockTransport>) -> Vec<&'static str> {
    dispatcher
        .commit_log()
        .map(|log| log.names())
        .unwrap_or_default()
}

fn shop_ids(shops: &[Shop]) -> Vec<i64> {
    shops.iter().map(|s| s.id).collect()
}

/// Let spawned tasks run up to their first await on the transport
async fn let_tasks_start() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ===== Envelope gating =====

#[tokio::test(start_paused = true)]
async fn test_success_commits_exactly_one_mutation() {
    let transport = MockTransport::new();
    transport.reply(
        "/api/index_category",
        Reply::ok(json!([
            {"id": 1, "title": "甜品饮品", "image_url": "/images/1.jpg"},
            {"id": 2, "title": "商超便利", "image_url": "/images/2.jpg"}
        ])),
    );
    let mut dispatcher = dispatcher(&transport);
    let before = dispatcher.state().clone();

    let outcome = dispatcher.run(Action::GetCategories).await.unwrap();

    assert_eq!(outcome, Outcome::Committed("receive_categories"));
    let state = dispatcher.state();
    assert_eq!(state.categories.len(), 2);
    assert_eq!(state.categories[1].title, "商超便利");

    // No other field changed
    let untouched = AppState {
        categories: before.categories.clone(),
        ..state.clone()
    };
    assert_eq!(untouched, before);

    assert_eq!(committed(&dispatcher), vec!["receive_categories"]);
}

/// Every action that commits on success
fn committing_actions() -> Vec<Action> {
    vec![
        Action::GetAddress,
        Action::GetCategories,
        Action::GetShops,
        Action::SearchShops {
            keyword: "粥".into(),
        },
        Action::LoginPwd {
            name: "admin".into(),
            pwd: "123456".into(),
            captcha: "abcd".into(),
        },
        Action::LoginSms {
            phone: "13716962779".into(),
            code: "123456".into(),
        },
        Action::GetUserInfo,
        Action::Logout,
        Action::GetShopInfo,
        Action::GetShopRatings,
        Action::GetShopGoods,
    ]
}

#[tokio::test(start_paused = true)]
async fn test_business_failure_leaves_state_unchanged() {
    let config = ClientConfig::default();
    let routes = Api::new(
        MockTransport::new(),
        config.api_prefix.clone(),
        config.mock_prefix.clone(),
    );
    let initial = AppState::new(config.latitude, config.longitude);

    for action in committing_actions() {
        let transport = MockTransport::new();
        let path = routes.path_for(&action.request(&initial));
        transport.reply(path.clone(), Reply::failure(1, "请先登陆"));
        let mut dispatcher = dispatcher(&transport);
        let before = dispatcher.state().clone();

        let err = dispatcher.run(action.clone()).await.unwrap_err();

        match err {
            ActionError::Business { code, message } => {
                assert_eq!(code, 1, "{:?}", action);
                assert_eq!(message, "请先登陆", "{:?}", action);
            }
            other => panic!(
                "{:?} at {}: expected business failure, got {:?}",
                action, path, other
            ),
        }
        assert_eq!(dispatcher.state(), &before, "{:?} changed state", action);
        assert!(committed(&dispatcher).is_empty(), "{:?} committed", action);
    }
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_is_surfaced() {
    let transport = MockTransport::new();
    transport.reply("/api/shops", Reply::error("connection refused"));
    let mut dispatcher = dispatcher(&transport);

    let err = dispatcher.run(Action::GetShops).await.unwrap_err();

    assert!(matches!(err, ActionError::Transport(_)));
    assert!(dispatcher.state().shops.is_empty());
    assert_eq!(dispatcher.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_is_a_distinct_error() {
    let transport = MockTransport::new();
    transport.reply("/api/shops", Reply::ok(json!("not a list")));
    let mut dispatcher = dispatcher(&transport);

    let err = dispatcher.run(Action::GetShops).await.unwrap_err();

    assert!(matches!(err, ActionError::Payload { action: "get_shops", .. }));
    assert!(committed(&dispatcher).is_empty());
}

/// Transport whose every call panics
struct PanicTransport;

#[async_trait]
impl Transport for PanicTransport {
    async fn send(
        &self,
        path: &str,
        _params: &Params,
        _method: Method,
    ) -> Result<Envelope, TransportError> {
        panic!("transport exploded on {}", path)
    }
}

#[tokio::test]
async fn test_panicking_transport_resolves_instead_of_hanging() {
    let mut dispatcher = Dispatcher::new(&ClientConfig::default(), PanicTransport);

    let run = dispatcher.run(Action::GetCategories);
    let result = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("dispatcher hung on a panicked task");

    match result {
        Err(ActionError::Panicked(panicked)) => {
            assert_eq!(panicked.0, "transport exploded on /api/index_category");
        }
        other => panic!("expected a panicked task, got {:?}", other),
    }
    assert_eq!(dispatcher.in_flight(), 0);
    assert!(dispatcher.state().categories.is_empty());
    assert!(!dispatcher.is_running(&TaskKey::new("categories")));

    // Later actions still settle
    let handle = dispatcher.dispatch(Action::GetShops);
    tokio::time::timeout(Duration::from_secs(2), dispatcher.settle_all())
        .await
        .expect("dispatcher hung on a panicked task");
    assert!(matches!(handle.result().await, Err(ActionError::Panicked(_))));
}

#[tokio::test(start_paused = true)]
async fn test_send_code_is_acknowledged_without_commit() {
    let transport = MockTransport::new();
    transport.reply("/api/sendcode", Reply::ok(json!(null)));
    let mut dispatcher = dispatcher(&transport);

    let outcome = dispatcher
        .run(Action::SendCode {
            phone: "13716962779".into(),
        })
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Acknowledged);
    assert!(committed(&dispatcher).is_empty());
    assert_eq!(transport.requests()[0].params.query_string(), "phone=13716962779");
}

// ===== Requests =====

#[tokio::test(start_paused = true)]
async fn test_requests_use_state_coordinates() {
    let transport = MockTransport::new();
    transport
        .reply("/api/position/40.10038,116.36867", Reply::ok(json!({"name": "宏福科技园"})))
        .reply("/api/shops", Reply::ok(json!([])))
        .reply("/api/search_shops", Reply::ok(json!([{"id": 9}])));
    let mut dispatcher = dispatcher(&transport);

    dispatcher.run(Action::GetAddress).await.unwrap();
    dispatcher.run(Action::GetShops).await.unwrap();
    dispatcher
        .run(Action::SearchShops {
            keyword: "粥".into(),
        })
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].params.is_empty());
    assert_eq!(
        requests[1].params.query_string(),
        "latitude=40.10038&longitude=116.36867"
    );
    assert_eq!(
        requests[2].params.query_string(),
        "geohash=40.10038,116.36867&keyword=粥"
    );
    assert!(requests.iter().all(|r| r.method == Method::Get));

    let state = dispatcher.state();
    assert_eq!(state.address.as_ref().map(|a| a.name.as_str()), Some("宏福科技园"));
    assert_eq!(shop_ids(&state.search_shops), vec![9]);
}

#[tokio::test(start_paused = true)]
async fn test_login_posts_and_logout_resets() {
    let transport = MockTransport::new();
    transport
        .reply("/api/login_pwd", Reply::ok(json!({"_id": "5b6", "name": "abc"})))
        .reply("/api/logout", Reply::ok(json!(null)));
    let mut dispatcher = dispatcher(&transport);

    let outcome = dispatcher
        .run(Action::LoginPwd {
            name: "abc".into(),
            pwd: "123".into(),
            captcha: "x7ke".into(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Committed("receive_user_info"));
    assert_eq!(
        dispatcher.state().user_info.as_ref().map(|u| u.id.as_str()),
        Some("5b6")
    );

    let login = &transport.requests()[0];
    assert_eq!(login.method, Method::Post);
    assert_eq!(
        login.params.to_json(),
        json!({"name": "abc", "pwd": "123", "captcha": "x7ke"})
    );

    dispatcher.run(Action::Logout).await.unwrap();
    assert_eq!(dispatcher.state().user_info, None);
    assert_committed!(committed(&dispatcher), "reset_user_info");
}

#[tokio::test(start_paused = true)]
async fn test_shop_page_uses_local_mock_routes() {
    let transport = MockTransport::new();
    transport
        .reply("/info", Reply::ok(json!({"name": "嘉禾一品（温都水城）", "minPrice": 20})))
        .reply(
            "/ratings",
            Reply::ok(json!([{"rateType": 0}, {"rateType": 1}, {"rateType": 0}])),
        )
        .reply("/goods", Reply::ok(json!([{"name": "热销榜", "type": -1, "foods": []}])));
    let mut dispatcher = dispatcher(&transport);

    let handles = [
        dispatcher.dispatch(Action::GetShopInfo),
        dispatcher.dispatch(Action::GetShopRatings),
        dispatcher.dispatch(Action::GetShopGoods),
    ];
    assert_eq!(dispatcher.in_flight(), 3);
    dispatcher.settle_all().await;

    for handle in handles {
        assert!(matches!(handle.result().await, Ok(Outcome::Committed(_))));
    }

    let state = dispatcher.state();
    assert_eq!(state.info.as_ref().map(|i| i.min_price), Some(20.0));
    assert_eq!(getters::positive_size(state), 2);
    assert_eq!(state.goods[0].kind, -1);
}

// ===== Ordering =====

#[tokio::test(start_paused = true)]
async fn test_later_arrival_of_later_dispatch_wins() {
    for ordering in [OrderingPolicy::LastArrival, OrderingPolicy::LatestDispatch] {
        let transport = MockTransport::new();
        transport
            .reply("/api/shops", Reply::ok(json!([{"id": 1}])).after_ms(10))
            .reply("/api/shops", Reply::ok(json!([{"id": 2}])).after_ms(50));
        let mut dispatcher = dispatcher_with(&transport, ordering);

        let a = dispatcher.dispatch(Action::GetShops);
        let_tasks_start().await;
        let b = dispatcher.dispatch(Action::GetShops);
        dispatcher.settle_all().await;

        assert_eq!(a.result().await.unwrap(), Outcome::Committed("receive_shops"));
        assert_eq!(b.result().await.unwrap(), Outcome::Committed("receive_shops"));
        assert_eq!(shop_ids(&dispatcher.state().shops), vec![2], "{:?}", ordering);
    }
}

#[tokio::test(start_paused = true)]
async fn test_last_arrival_lets_stale_response_land() {
    let transport = MockTransport::new();
    transport
        .reply("/api/shops", Reply::ok(json!([{"id": 1}])).after_ms(50))
        .reply("/api/shops", Reply::ok(json!([{"id": 2}])).after_ms(10));
    let mut dispatcher = dispatcher_with(&transport, OrderingPolicy::LastArrival);

    let older = dispatcher.dispatch(Action::GetShops);
    let_tasks_start().await;
    let newer = dispatcher.dispatch(Action::GetShops);
    dispatcher.settle_all().await;

    assert_eq!(newer.result().await.unwrap(), Outcome::Committed("receive_shops"));
    assert_eq!(older.result().await.unwrap(), Outcome::Committed("receive_shops"));
    // The older request answered last, so its data is what remains
    assert_eq!(shop_ids(&dispatcher.state().shops), vec![1]);
    assert_eq!(committed(&dispatcher), vec!["receive_shops", "receive_shops"]);
}

#[tokio::test(start_paused = true)]
async fn test_latest_dispatch_drops_stale_response() {
    let transport = MockTransport::new();
    transport
        .reply("/api/shops", Reply::ok(json!([{"id": 1}])).after_ms(50))
        .reply("/api/shops", Reply::ok(json!([{"id": 2}])).after_ms(10));
    let mut dispatcher = dispatcher_with(&transport, OrderingPolicy::LatestDispatch);

    let older = dispatcher.dispatch(Action::GetShops);
    let_tasks_start().await;
    let newer = dispatcher.dispatch(Action::GetShops);
    assert!(older.ticket().seq() < newer.ticket().seq());
    dispatcher.settle_all().await;

    assert_eq!(newer.result().await.unwrap(), Outcome::Committed("receive_shops"));
    assert_eq!(older.result().await.unwrap(), Outcome::Superseded);
    assert_eq!(shop_ids(&dispatcher.state().shops), vec![2]);
    assert_eq!(committed(&dispatcher), vec!["receive_shops"]);
}

#[tokio::test(start_paused = true)]
async fn test_targets_are_sequenced_independently() {
    let transport = MockTransport::new();
    transport
        .reply("/api/shops", Reply::ok(json!([{"id": 1}])).after_ms(50))
        .reply("/api/search_shops", Reply::ok(json!([{"id": 2}])).after_ms(10));
    let mut dispatcher = dispatcher(&transport);

    let shops = dispatcher.dispatch(Action::GetShops);
    let search = dispatcher.dispatch(Action::SearchShops {
        keyword: "面".into(),
    });
    dispatcher.settle_all().await;

    assert_eq!(search.result().await.unwrap(), Outcome::Committed("receive_search_shops"));
    assert_eq!(shops.result().await.unwrap(), Outcome::Committed("receive_shops"));
    assert_eq!(shop_ids(&dispatcher.state().shops), vec![1]);
    assert_eq!(shop_ids(&dispatcher.state().search_shops), vec![2]);
}

// ===== Cancellation =====

#[tokio::test(start_paused = true)]
async fn test_cancel_resolves_handles_as_cancelled() {
    let transport = MockTransport::new();
    transport.reply(
        "/api/userinfo",
        Reply::ok(json!({"_id": "5b6"})).after_ms(100),
    );
    let mut dispatcher = dispatcher(&transport);

    let mut handle = dispatcher.dispatch(Action::GetUserInfo);
    let_tasks_start().await;
    assert!(handle.try_result().is_none());
    assert!(dispatcher.is_running(&TaskKey::from("user_info")));

    assert_eq!(dispatcher.cancel(&TaskKey::from("user_info")), 1);

    assert!(matches!(handle.result().await, Err(ActionError::Cancelled)));
    assert_eq!(dispatcher.in_flight(), 0);
    assert!(!dispatcher.settle_next().await);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(dispatcher.state().user_info, None);
    assert!(committed(&dispatcher).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_leaves_other_targets_running() {
    let transport = MockTransport::new();
    transport
        .reply("/api/shops", Reply::ok(json!([{"id": 3}])).after_ms(20))
        .reply("/api/index_category", Reply::ok(json!([])).after_ms(20));
    let mut dispatcher = dispatcher(&transport);

    let shops = dispatcher.dispatch(Action::GetShops);
    let categories = dispatcher.dispatch(Action::GetCategories);
    assert_eq!(dispatcher.cancel(&TaskKey::from("categories")), 1);
    dispatcher.settle_all().await;

    assert!(matches!(categories.result().await, Err(ActionError::Cancelled)));
    assert_eq!(shops.result().await.unwrap(), Outcome::Committed("receive_shops"));
    assert_eq!(shop_ids(&dispatcher.state().shops), vec![3]);
}

// ===== Synchronous actions =====

#[tokio::test]
async fn test_cart_actions() {
    let transport = MockTransport::new();
    let mut dispatcher = dispatcher(&transport);
    let porridge = Food {
        name: "皮蛋瘦肉粥".into(),
        price: 10.0,
        ..Default::default()
    };
    let cake = Food {
        name: "葱花饼".into(),
        price: 5.0,
        ..Default::default()
    };

    assert!(dispatcher.update_food_count(&porridge, true));
    assert!(dispatcher.update_food_count(&porridge, true));
    assert!(dispatcher.update_food_count(&cake, true));
    assert_eq!(getters::total_count(dispatcher.state()), 3);
    assert_eq!(getters::total_price(dispatcher.state()), 25.0);

    assert!(dispatcher.update_food_count(&cake, false));
    assert!(!dispatcher.update_food_count(&cake, false));
    assert_eq!(dispatcher.state().cart_item(&cake), None);

    assert!(dispatcher.clear_cart());
    assert_eq!(getters::total_count(dispatcher.state()), 0);
    assert_eq!(getters::total_price(dispatcher.state()), 0.0);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_record_user() {
    let transport = MockTransport::new();
    let mut dispatcher = dispatcher(&transport);

    let user = UserInfo {
        id: "5b6".into(),
        phone: Some("13716962779".into()),
        ..Default::default()
    };
    assert!(dispatcher.record_user(user.clone()));
    assert_eq!(dispatcher.state().user_info, Some(user));
    assert_committed!(committed(&dispatcher), "receive_user_info");
}

#[tokio::test(start_paused = true)]
async fn test_record_user_supersedes_earlier_fetch() {
    let transport = MockTransport::new();
    transport.reply("/api/userinfo", Reply::ok(json!({"_id": "old"})).after_ms(50));
    let mut dispatcher = dispatcher_with(&transport, OrderingPolicy::LatestDispatch);

    let fetch = dispatcher.dispatch(Action::GetUserInfo);
    let_tasks_start().await;
    assert!(dispatcher.record_user(UserInfo {
        id: "new".into(),
        ..Default::default()
    }));
    dispatcher.settle_all().await;

    assert_eq!(fetch.result().await.unwrap(), Outcome::Superseded);
    let user = dispatcher.state().user_info.as_ref().map(|u| u.id.as_str());
    assert_eq!(user, Some("new"));
    assert_eq!(committed(&dispatcher), vec!["receive_user_info"]);
}
