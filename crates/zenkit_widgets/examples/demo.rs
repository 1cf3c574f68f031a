//! Widgets Demo
//!
//! Builds a small page, wires every widget with `init_all` and drives it the
//! way a host would: forwarding clicks and keys and moving the clock.
//!
//! Run with: RUST_LOG=zenkit_widgets=debug cargo run -p zenkit_widgets --example demo

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use zenkit_widgets::prelude::*;

fn build_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    doc.append(
        body,
        element("button")
            .id("open-dialog")
            .data("toggle", "modal")
            .data("target", "#dialog"),
    );
    doc.append(
        body,
        element("div")
            .id("dialog")
            .class("modal fade")
            .child(
                element("div")
                    .class("modal-dialog")
                    .child(element("button").id("close-dialog").data("dismiss", "modal")),
            ),
    );
    doc.append(
        body,
        element("div")
            .class("dropdown")
            .child(element("button").id("menu").class("dropdown-toggle"))
            .child(element("ul").class("dropdown-menu").children([
                element("a").class("dropdown-item").text("Profile"),
                element("a").class("dropdown-item").text("Sign out"),
            ])),
    );
    doc.append(
        body,
        element("div")
            .id("slides")
            .class("carousel")
            .data("interval", "2000")
            .child(element("div").class("carousel-inner").children([
                element("div").class("carousel-item active"),
                element("div").class("carousel-item"),
                element("div").class("carousel-item"),
            ]))
            .bounds(Rect::new(0.0, 100.0, 800.0, 300.0)),
    );
    doc
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut zk = Zenkit::new(build_page());
    let report = zk.init_all();
    for (kind, created) in report.iter().filter(|(_, n)| *n > 0) {
        println!("{:>10}: {created}", kind.event_name());
    }

    let dialog = zk.resolve("#dialog").context("missing #dialog")?;
    zk.on(dialog, "shown.zk.modal", |_| println!("modal shown"));
    zk.on(dialog, "hidden.zk.modal", |_| println!("modal hidden"));

    let open = zk.resolve("#open-dialog").context("missing trigger")?;
    zk.click(open);
    zk.advance(300);
    zk.key_down(dialog, Key::Escape);
    zk.advance(300);

    let menu = zk.resolve("#menu").context("missing #menu")?;
    zk.click(menu);
    println!("dropdown: {:?}", zk.visibility::<Dropdown>(menu));
    zk.key_down(menu, Key::Escape);
    println!("dropdown: {:?}", zk.visibility::<Dropdown>(menu));

    let slides = zk.resolve("#slides").context("missing #slides")?;
    zk.on(slides, "slid.zk.carousel", |event| {
        if let EventDetail::Slide { from, to, .. } = event.detail() {
            println!("slid {from} -> {to}");
        }
    });
    Carousel::cycle(&mut zk, slides);
    zk.advance(7000);

    zk.create_toast(ToastSpec::new("Saved").title("Status").kind("success"));
    zk.advance(6000);
    Ok(())
}
