mod common;

use common::{CLUSTER_TAG, FakeCloud, ROLE_TAG};
use osmachine_cloud::ServerStatus;
use osmachine_core::{Locator, MachineError, OwnershipTags};

fn tags() -> OwnershipTags {
    OwnershipTags::new(CLUSTER_TAG, ROLE_TAG)
}

#[tokio::test]
async fn test_by_name_single_match() {
    let cloud = FakeCloud::new();
    cloud.add_owned_server("srv-1", "node-0", ServerStatus::Active);
    // substring matches returned by the service are dropped
    cloud.add_owned_server("srv-2", "node-01", ServerStatus::Active);

    let server = Locator::new(&*cloud).by_name("node-0", &tags()).await.unwrap();

    assert_eq!(server.id, "srv-1");
}

#[tokio::test]
async fn test_by_name_none() {
    let cloud = FakeCloud::new();
    cloud.add_server("srv-1", "node-0", ServerStatus::Active, &[CLUSTER_TAG]);

    let err = Locator::new(&*cloud)
        .by_name("node-0", &tags())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_by_name_ambiguous() {
    let cloud = FakeCloud::new();
    cloud.add_owned_server("srv-1", "node-0", ServerStatus::Active);
    cloud.add_owned_server("srv-2", "node-0", ServerStatus::Build);

    let err = Locator::new(&*cloud)
        .by_name("node-0", &tags())
        .await
        .unwrap_err();

    assert!(matches!(err, MachineError::MultipleFound { name } if name == "node-0"));
}

#[tokio::test]
async fn test_by_provider_id() {
    let cloud = FakeCloud::new();
    cloud.add_owned_server("srv-1", "node-0", ServerStatus::Active);

    let server = Locator::new(&*cloud)
        .by_provider_id("openstack:///RegionOne/srv-1", Some(&tags()))
        .await
        .unwrap();

    assert_eq!(server.name, "node-0");
    assert_eq!(cloud.calls(), vec!["get_server:srv-1"]);
}

#[tokio::test]
async fn test_by_provider_id_untagged_is_not_found() {
    let cloud = FakeCloud::new();
    cloud.add_server("srv-1", "node-0", ServerStatus::Active, &[ROLE_TAG]);

    let err = Locator::new(&*cloud)
        .by_provider_id("openstack:///RegionOne/srv-1", Some(&tags()))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_by_provider_id_without_configured_tags() {
    let cloud = FakeCloud::new();
    cloud.add_owned_server("srv-1", "node-0", ServerStatus::Active);

    let err = Locator::new(&*cloud)
        .by_provider_id("openstack:///RegionOne/srv-1", None)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(cloud.calls(), vec!["get_server:srv-1"]);
}

#[tokio::test]
async fn test_by_provider_id_malformed_queries_nothing() {
    let cloud = FakeCloud::new();

    let err = Locator::new(&*cloud)
        .by_provider_id("openstack:///RegionOne/", Some(&tags()))
        .await
        .unwrap_err();

    assert!(matches!(err, MachineError::MalformedProviderId(_)));
    assert!(cloud.calls().is_empty());
}

#[tokio::test]
async fn test_list_owned_empty() {
    let cloud = FakeCloud::new();

    let machines = Locator::new(&*cloud)
        .list_owned("RegionOne", &tags())
        .await
        .unwrap();

    assert!(machines.is_empty());
}
