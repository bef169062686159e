use anyhow::{Context, Result, bail};
use odata_routing::sample;
use odata_router::{RouteOptions, RouteRequest, Router, TemplateRegistry};
use tracing_subscriber::EnvFilter;
use url::Url;

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<bool>()
            .with_context(|| format!("{name} must be 'true' or 'false', got '{value}'")),
        Err(_) => Ok(default),
    }
}

/// Split decoded path segments into (request prefix, remaining segments)
/// using the first registered prefix that binds.
fn split_prefix(registry: &TemplateRegistry, parts: &[String]) -> Option<(String, Vec<String>)> {
    registry.prefixes().find_map(|prefix| {
        let n = prefix.segments().len();
        let head = parts.get(..n)?;
        prefix.bind_segments(head)?;
        Some((head.join("/"), parts[n..].to_vec()))
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let prefix = std::env::var("ODATA_PREFIX").unwrap_or_else(|_| sample::DEFAULT_PREFIX.to_string());
    let options = RouteOptions::default()
        .with_case_insensitive(env_flag("ODATA_CASE_INSENSITIVE", false)?)
        .with_unqualified_operation_call(env_flag("ODATA_UNQUALIFIED_CALLS", true)?);

    let mut args = std::env::args().skip(1);
    let (Some(method), Some(target)) = (args.next(), args.next()) else {
        bail!("usage: odata-resolve <METHOD> <URL or path>");
    };

    let (registry, report) = sample::build_registry(&prefix, options)?;
    println!(
        "Bound {} routes under '{prefix}' ({} handlers unresolved)",
        report.registered,
        report.unresolved.len()
    );

    let base = Url::parse("http://localhost/")?;
    let url = base.join(&target).with_context(|| format!("invalid URL '{target}'"))?;
    let parts = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| urlencoding::decode(s).map(|d| d.into_owned()))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    let router = Router::new(registry);
    let Some((request_prefix, segments)) = split_prefix(router.registry(), &parts) else {
        bail!("'{}' is not under any registered prefix", url.path());
    };

    let request = RouteRequest {
        prefix: request_prefix,
        method,
        segments,
        ..Default::default()
    };

    match router.route(&request) {
        Ok(matched) => {
            println!("{}", matched.entry);
            for (name, value) in &matched.bindings.prefix {
                println!("  prefix {name} = {value}");
            }
            if let Some(entity_set) = &matched.bindings.entity_set {
                println!("  entity set = {entity_set}");
            }
            for (name, value) in &matched.bindings.keys {
                println!("  key {name} = {value}");
            }
            for (name, value) in &matched.bindings.arguments {
                println!("  argument {name} = {value}");
            }
            if let Some(navigation) = &matched.bindings.navigation {
                println!("  navigation = {navigation}");
            }
            if let Some(property) = &matched.bindings.named_value {
                println!("  property = {property}");
            }
            if matched.bindings.count {
                println!("  $count");
            }
            Ok(())
        }
        Err(e) => bail!("{} {e}", e.status_code()),
    }
}
