use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::capability::{Capability, has_capability};
use crate::auth::session::SessionState;
use crate::view::auth_form::AuthForm;

pub const AUTH_PATH: &str = "/auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserMenu {
    pub avatar_initial: String,
    pub display_name: String,
    pub email: String,
    pub role_label: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub links: Vec<NavLink>,
    pub user_menu: Option<UserMenu>,
    pub auth_entries: Vec<NavLink>,
    pub redirect: Option<&'static str>,
}

const MEMBER_LINKS: [(&str, &str); 3] = [
    ("/", "Dashboard"),
    ("/create-report", "Report Issue"),
    ("/my-reports", "My Reports"),
];

const ADMIN_LINK: (&str, &str) = ("/admin", "Admin Panel");

fn link((path, label): (&'static str, &'static str), current: &str) -> NavLink {
    NavLink {
        path,
        label,
        active: path == current,
    }
}

/// First character of the full name, else of the email, else `U`.
pub fn avatar_initial(full_name: Option<&str>, email: Option<&str>) -> String {
    full_name
        .and_then(|n| n.chars().next())
        .or_else(|| email.and_then(|e| e.chars().next()))
        .unwrap_or('U')
        .to_string()
}

pub fn build_navigation(session: &SessionState, current_path: &str) -> Navigation {
    let Some(user) = &session.user else {
        return Navigation {
            links: Vec::new(),
            user_menu: None,
            auth_entries: vec![
                NavLink {
                    path: AUTH_PATH,
                    label: "Sign In",
                    active: current_path == AUTH_PATH,
                },
                NavLink {
                    path: AUTH_PATH,
                    label: "Get Started",
                    active: false,
                },
            ],
            redirect: None,
        };
    };

    let mut links: Vec<NavLink> = MEMBER_LINKS.iter().map(|l| link(*l, current_path)).collect();
    if session
        .role()
        .is_some_and(|role| has_capability(role, Capability::AdminPanel))
    {
        links.push(link(ADMIN_LINK, current_path));
    }

    let full_name = session.profile.as_ref().and_then(|p| p.full_name.as_deref());
    let user_menu = UserMenu {
        avatar_initial: avatar_initial(full_name, Some(&user.email)),
        display_name: full_name
            .filter(|n| !n.is_empty())
            .unwrap_or("User")
            .to_string(),
        email: user.email.clone(),
        role_label: session.role().map(|r| r.label()),
    };

    let redirect = if current_path == AUTH_PATH {
        AuthForm::redirect_target(session)
    } else {
        None
    };

    Navigation {
        links,
        user_menu: Some(user_menu),
        auth_entries: Vec::new(),
        redirect,
    }
}
