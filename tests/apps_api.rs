//! Apps and workloads endpoints over the fake bookinfo cluster

mod helper;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use helper::cluster::NAMESPACE;
use helper::{FakeCluster, FakeMetrics, bookinfo_router, get_json, router_with};
use meshscope::config::Config;

#[tokio::test]
async fn lists_apps_of_namespace() {
    let (status, body) = get_json(bookinfo_router(), "/api/namespaces/bookinfo/apps").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["namespace"]["name"], NAMESPACE);

    let names: Vec<&str> = body["applications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|app| app["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["details", "reviews"]);
    assert!(body["applications"][0].get("health").is_none());
}

#[tokio::test]
async fn app_list_merges_version_labels() {
    let (_, body) = get_json(bookinfo_router(), "/api/namespaces/bookinfo/apps").await;

    let reviews = &body["applications"][1];
    assert_eq!(reviews["istioSidecar"], true);
    assert_eq!(reviews["labels"], json!({ "app": "reviews", "version": "v1,v2" }));
}

#[tokio::test]
async fn app_list_includes_health_when_requested() {
    let (status, body) = get_json(
        bookinfo_router(),
        "/api/namespaces/bookinfo/apps?health=true&rateInterval=5m",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let details = &body["applications"][0];
    assert_eq!(details["health"]["workloadStatuses"][0]["name"], "details-v1");
    assert_eq!(details["health"]["workloadStatuses"][0]["syncedProxies"], 1);
    assert_eq!(details["health"]["requests"]["inbound"]["http"]["200"], 2.0);
}

#[tokio::test]
async fn app_details_lists_workloads_and_services() {
    let (status, body) = get_json(bookinfo_router(), "/api/namespaces/bookinfo/apps/reviews").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "reviews");
    assert_eq!(body["serviceNames"], json!(["reviews"]));

    let workloads: Vec<&str> = body["workloads"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["workloadName"].as_str().unwrap())
        .collect();
    assert_eq!(workloads, vec!["reviews-v1", "reviews-v2"]);
    assert_eq!(
        body["workloads"][0]["serviceAccountNames"],
        json!(["bookinfo-reviews"])
    );
}

#[rstest]
#[case("/api/namespaces/bookinfo/apps/ratings", StatusCode::NOT_FOUND)]
#[case("/api/namespaces/missing/apps", StatusCode::NOT_FOUND)]
#[case("/api/namespaces/bookinfo/apps?health=true&rateInterval=soon", StatusCode::BAD_REQUEST)]
#[tokio::test]
async fn app_errors_map_to_status(#[case] uri: &str, #[case] expected: StatusCode) {
    let (status, body) = get_json(bookinfo_router(), uri).await;

    assert_eq!(status, expected);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn app_health_fails_when_prometheus_is_down() {
    let app = router_with(FakeCluster::bookinfo(), FakeMetrics::failing(), Config::default());

    let (status, _) = get_json(app, "/api/namespaces/bookinfo/apps?health=true").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn lists_workloads_of_namespace() {
    let (status, body) = get_json(bookinfo_router(), "/api/namespaces/bookinfo/workloads").await;

    assert_eq!(status, StatusCode::OK);
    let workloads = body["workloads"].as_array().unwrap();
    let names: Vec<&str> = workloads
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["details-v1", "reviews-v1", "reviews-v2"]);
    assert!(workloads.iter().all(|w| w["type"] == "Deployment"));
    assert!(workloads.iter().all(|w| w["podCount"] == 1));
}

#[tokio::test]
async fn workload_list_includes_health_when_requested() {
    let (status, body) = get_json(
        bookinfo_router(),
        "/api/namespaces/bookinfo/workloads?health=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let details = &body["workloads"][0];
    assert_eq!(details["health"]["workloadStatus"]["desiredReplicas"], 1);
    assert_eq!(details["health"]["workloadStatus"]["syncedProxies"], 1);
    assert_eq!(details["health"]["requests"]["inbound"]["http"]["200"], 2.0);
}

#[tokio::test]
async fn workload_details_include_pods_and_services() {
    let (status, body) = get_json(
        bookinfo_router(),
        "/api/namespaces/bookinfo/workloads/details-v1?workloadType=Deployment",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "details-v1");
    assert_eq!(body["pods"][0]["name"], "details-v1-3618568057-zbjmz");
    assert_eq!(body["services"][0]["name"], "details");
    assert!(body.get("health").is_none());
}

#[tokio::test]
async fn missing_workload_is_not_found() {
    let (status, body) = get_json(
        bookinfo_router(),
        "/api/namespaces/bookinfo/workloads/ratings-v1",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Workload ratings-v1 not found in namespace bookinfo"
    );
}
