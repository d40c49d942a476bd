use super::*;
use crate::guard::{GuardConfig, MSG_UNAUTHORIZED};
use crate::routes::{RouteDescriptor, app_routes};
use crate::session::{SessionStore, UserProfile};
use crate::test_support::RecordingNotifier;
use std::sync::Arc;

struct Fixture {
    router: Router,
    session: SessionStore,
    notifier: Arc<RecordingNotifier>,
}

fn fixture(table: RouteTable) -> Fixture {
    let session = SessionStore::in_memory();
    let notifier = RecordingNotifier::new();
    let guard = NavigationGuard::new(GuardConfig::default(), session.clone(), notifier.clone());
    Fixture { router: Router::new(table, guard), session, notifier }
}

#[test]
fn anonymous_root_lands_on_login_with_dashboard_redirect() {
    let f = fixture(app_routes());
    let landed = f.router.navigate("/").unwrap();
    assert_eq!(landed.path, "/login");
    assert_eq!(landed.query_value("redirect"), Some("/dashboard"));
    assert_eq!(f.router.current(), Some(landed));
}

#[test]
fn anonymous_protected_route_preserves_query_in_redirect() {
    let f = fixture(app_routes());
    let landed = f.router.navigate("/orders?page=2").unwrap();
    assert_eq!(landed.query_value("redirect"), Some("/orders?page=2"));
}

#[test]
fn authenticated_login_visit_lands_on_dashboard() {
    let f = fixture(app_routes());
    f.session.set_session("tok", &UserProfile::new("1", "member"));
    assert_eq!(f.router.navigate("/login").unwrap().path, "/dashboard");
}

#[test]
fn member_on_admin_page_lands_on_default_with_one_notification() {
    let f = fixture(app_routes());
    f.session.set_session("tok", &UserProfile::new("1", "member"));
    assert_eq!(f.router.navigate("/users").unwrap().path, "/dashboard");
    assert_eq!(f.notifier.messages(), vec![MSG_UNAUTHORIZED.to_owned()]);
}

#[test]
fn admin_reaches_admin_page() {
    let f = fixture(app_routes());
    f.session.set_session("tok", &UserProfile::new("1", "admin"));
    assert_eq!(f.router.navigate("/users").unwrap().path, "/users");
    assert!(f.notifier.messages().is_empty());
}

#[test]
fn unknown_path_is_not_found_and_keeps_current() {
    let f = fixture(app_routes());
    f.router.navigate("/register").unwrap();
    assert_eq!(f.router.navigate("/missing"), Err(RouterError::NotFound("/missing".into())));
    assert_eq!(f.router.current().map(|l| l.path), Some("/register".to_owned()));
}

#[test]
fn redirect_cycle_is_bounded() {
    let table = RouteTable::new(vec![
        RouteDescriptor::new("/a").redirect("/b"),
        RouteDescriptor::new("/b").redirect("/a"),
    ]);
    let f = fixture(table);
    assert_eq!(f.router.navigate("/a"), Err(RouterError::RedirectLoop("/a".into())));
}

#[test]
fn push_after_session_clear_lands_on_login() {
    let f = fixture(app_routes());
    f.session.set_session("tok", &UserProfile::new("1", "member"));
    f.router.navigate("/orders").unwrap();

    f.session.clear_session();
    f.router.push("/login");

    assert_eq!(f.router.current().map(|l| l.path), Some("/login".to_owned()));
}

#[test]
fn push_to_unknown_path_is_swallowed() {
    let f = fixture(app_routes());
    f.router.push("/nope");
    assert_eq!(f.router.current(), None);
}

#[test]
fn record_redirect_carries_query_when_signed_in() {
    let f = fixture(app_routes());
    f.session.set_session("tok", &UserProfile::new("1", "member"));
    assert_eq!(f.router.navigate("/?tab=x").unwrap().full_path(), "/dashboard?tab=x");
}

#[test]
fn record_redirect_carries_query_into_login_target() {
    let f = fixture(app_routes());
    let landed = f.router.navigate("/?tab=x").unwrap();
    assert_eq!(landed.path, "/login");
    assert_eq!(landed.query_value("redirect"), Some("/dashboard?tab=x"));
}

#[test]
fn record_redirect_with_own_query_keeps_it() {
    let table = RouteTable::new(vec![
        RouteDescriptor::new("/old").redirect("/new?from=old"),
        RouteDescriptor::new("/new"),
    ]);
    let f = fixture(table);
    assert_eq!(f.router.navigate("/old?tab=x").unwrap().full_path(), "/new?from=old");
}

#[test]
fn role_denial_loop_notifies_once() {
    let table = RouteTable::new(vec![
        RouteDescriptor::new("/dashboard").roles(["admin"]),
        RouteDescriptor::new("/users").roles(["admin"]),
    ]);
    let f = fixture(table);
    f.session.set_session("tok", &UserProfile::new("1", "member"));

    assert_eq!(f.router.navigate("/users"), Err(RouterError::RedirectLoop("/users".into())));
    assert_eq!(f.notifier.messages(), vec![MSG_UNAUTHORIZED.to_owned()]);
}
