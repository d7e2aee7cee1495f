//! Plain-text rendering of engine views for the terminal.

use shelter_engine::{DirectoryView, PopoverContent, ShelterDetail};

/// Reverses the render models' HTML escaping for the terminal.
fn plain(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Truncates `text` to `max` characters, appending `...` when cut.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

pub(crate) fn print_directory(view: &DirectoryView) {
    let DirectoryView::Items { count, items } = view else {
        println!("no shelters found");
        return;
    };

    println!("{count} shelter(s)");
    println!(
        "{:<5}{:<32}{:<10}{:<14}ADDRESS",
        "#", "NAME", "DISTANCE", "CAPACITY"
    );
    for item in items {
        println!(
            "{:<5}{:<32}{:<10}{:<14}{}",
            item.index,
            clip(&plain(&item.name), 30),
            item.distance_label.as_deref().unwrap_or("-"),
            item.capacity_label,
            clip(&plain(&item.address), 50)
        );
    }
}

pub(crate) fn print_popover(popover: &PopoverContent) {
    match &popover.distance_label {
        Some(distance) => println!(
            "[{}] {} ({distance})",
            popover.index,
            plain(&popover.name)
        ),
        None => println!("[{}] {}", popover.index, plain(&popover.name)),
    }
    println!("  capacity: {}", popover.capacity_label);
    if let Some(link) = &popover.map_link {
        println!("  map:      {link}");
    }
}

pub(crate) fn print_detail(detail: &ShelterDetail) {
    println!("{}", detail.title);
    let rows = [
        ("Name", detail.name.as_str()),
        ("Address", detail.address.as_str()),
        ("Distance", detail.distance_label.as_deref().unwrap_or("-")),
        ("Capacity", detail.capacity_label.as_str()),
        ("Facility area", detail.facility_area.as_str()),
        ("Managed by", detail.management_agency.as_str()),
        ("Contact", detail.contact.as_str()),
        ("Designated", detail.designation_date.as_str()),
    ];
    for (label, value) in rows {
        println!("  {label:<15}{}", plain(value));
    }
    if let Some(link) = &detail.directions_link {
        println!("  {:<15}{link}", "Directions");
    }
}
