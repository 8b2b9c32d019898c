// src/services/seo_services.rs - robots.txt and sitemap.xml bodies

use chrono::{DateTime, SecondsFormat, Utc};

use crate::dtos::category_dtos::CategoryOut;
use crate::dtos::post_dtos::TagOut;
use crate::models::post::SitemapPost;

const DISALLOWED: &[&str] = &[
    "/(admin)/",
    "/login",
    "/signup",
    "/api/",
    "/dashboard",
    "/private/",
    "/_next/",
];

pub fn robots_txt(site_url: &str) -> String {
    let mut out = String::from("User-Agent: *\nAllow: /\n");
    for path in DISALLOWED {
        out.push_str("Disallow: ");
        out.push_str(path);
        out.push('\n');
    }
    out.push_str(&format!("\nSitemap: {}/sitemap.xml\n", site_url.trim_end_matches('/')));
    out
}

struct Entry {
    loc: String,
    last_modified: DateTime<Utc>,
    change_frequency: &'static str,
    priority: f32,
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn sitemap_xml(
    site_url: &str,
    posts: &[SitemapPost],
    categories: &[CategoryOut],
    tags: &[TagOut],
    now: DateTime<Utc>,
) -> String {
    let base = site_url.trim_end_matches('/');
    let mut entries = vec![
        Entry { loc: base.to_string(), last_modified: now, change_frequency: "daily", priority: 1.0 },
        Entry { loc: format!("{}/blog", base), last_modified: now, change_frequency: "daily", priority: 0.9 },
    ];
    entries.extend(posts.iter().map(|p| Entry {
        loc: format!("{}/blog/posts/{}", base, p.slug),
        last_modified: p.updated_at,
        change_frequency: "monthly",
        priority: 0.8,
    }));
    entries.extend(categories.iter().map(|c| Entry {
        loc: format!("{}/blog/category/{}", base, c.id),
        last_modified: now,
        change_frequency: "weekly",
        priority: 0.7,
    }));
    entries.extend(tags.iter().map(|t| Entry {
        loc: format!("{}/blog/tag/{}", base, urlencoding::encode(&t.name)),
        last_modified: now,
        change_frequency: "weekly",
        priority: 0.6,
    }));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for e in entries {
        xml.push_str(&format!(
            "<url>\n<loc>{}</loc>\n<lastmod>{}</lastmod>\n<changefreq>{}</changefreq>\n<priority>{:.1}</priority>\n</url>\n",
            xml_escape(&e.loc),
            e.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            e.change_frequency,
            e.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}
