use crate::config::RouteConfig;
use crate::models::user::UserProfile;

/// Route tree a visitor asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Decide whether the visitor may enter `area`, based on the staff flag of
/// the fetched profile.
pub fn resolve(profile: Option<&UserProfile>, area: Area, routes: &RouteConfig) -> RouteDecision {
    let Some(profile) = profile else {
        return RouteDecision::Redirect(routes.login.clone());
    };

    match (area, profile.is_staff) {
        (Area::Admin, false) => RouteDecision::Redirect(routes.user_home.clone()),
        (Area::User, true) => RouteDecision::Redirect(routes.admin_home.clone()),
        _ => RouteDecision::Allow,
    }
}

/// Home route for a signed-in profile
pub fn home_for(profile: &UserProfile, routes: &RouteConfig) -> String {
    if profile.is_staff {
        routes.admin_home.clone()
    } else {
        routes.user_home.clone()
    }
}
