use super::handlers::{health, is_admin, user_login, user_register};
use utoipa::openapi::{Contact, Info, InfoBuilder, License, OpenApi, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Routes registered here are both served and documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let doc = OpenApiBuilder::new().info(service_info()).build();
    let mut router = OpenApiRouter::with_openapi(doc)
        .routes(routes!(health::health))
        .routes(routes!(user_register::register))
        .routes(routes!(user_login::login))
        .routes(routes!(is_admin::is_admin));

    router.get_openapi_mut().tags = Some(vec![
        tag("health", "Service liveness"),
        tag("auth", "Registration, login and role checks"),
    ]);

    router
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn service_info() -> Info {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = maintainer(env!("CARGO_PKG_AUTHORS"));
    info.license = non_empty(env!("CARGO_PKG_LICENSE")).map(|spdx| {
        let mut license = License::new(spdx);
        license.identifier = Some(spdx.to_string());
        license
    });

    info
}

// First entry of a `;` separated authors list, as "Name <email>".
fn maintainer(authors: &str) -> Option<Contact> {
    let first = authors.split(';').next()?;
    let (name, email) = match first.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(first), None),
    };

    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_pair(contact: Option<Contact>) -> Option<(Option<String>, Option<String>)> {
        contact.map(|c| (c.name, c.email))
    }

    #[test]
    fn info_comes_from_package_metadata() {
        let info = openapi().info;

        assert_eq!(info.title, "sso");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            contact_pair(info.contact),
            Some((Some("Team SSO".to_string()), Some("team@sso.dev".to_string())))
        );
        assert_eq!(
            info.license.map(|l| (l.name, l.identifier)),
            Some(("BSD-3-Clause".to_string(), Some("BSD-3-Clause".to_string())))
        );
    }

    #[test]
    fn documents_every_endpoint() {
        let doc = openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(tags, ["health", "auth"]);

        let mut paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        paths.sort_unstable();
        assert_eq!(paths, ["/health", "/is_admin", "/login", "/register"]);
    }

    #[test]
    fn maintainer_takes_first_author() {
        let pair = |authors| contact_pair(maintainer(authors));
        let s = |v: &str| Some(v.to_string());

        assert_eq!(
            pair("Ops <ops@sso.dev>; Dev <dev@sso.dev>"),
            Some((s("Ops"), s("ops@sso.dev")))
        );
        assert_eq!(pair("Ops"), Some((s("Ops"), None)));
        assert_eq!(pair(" <ops@sso.dev>"), Some((None, s("ops@sso.dev"))));
        assert_eq!(pair(""), None);
        assert_eq!(pair("  <> "), None);
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  sso "), Some("sso"));
        assert_eq!(non_empty(" \t"), None);
    }
}
