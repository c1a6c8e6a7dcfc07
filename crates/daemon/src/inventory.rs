// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory reporter (spec.md §4.6): collects a fresh `InstanceInventory`
//! and publishes it field-by-field to the attributes sink. A field table
//! (spec.md §9 redesign note) replaces reflection-based posting with an
//! explicit, fixed-order list so failures are individually attributable.

use base64::Engine;
use osconfig_adapters::AttributesSink;
use osconfig_core::{InstanceInventory, Packages};
use std::io::Write;

enum FieldPayload<'a> {
    Raw(&'a str),
    Owned(String),
    CompressedJson(&'a Packages),
}

/// `(field-name, extractor)` pairs, iterated in a fixed order.
fn field_table(inventory: &InstanceInventory) -> Vec<(&'static str, FieldPayload<'_>)> {
    let mut fields: Vec<(&'static str, FieldPayload<'_>)> =
        inventory.string_fields().into_iter().map(|(name, value)| (name, FieldPayload::Raw(value))).collect();
    fields.push(("LastUpdated", FieldPayload::Owned(inventory.last_updated.to_rfc3339())));
    fields.push(("InstalledPackages", FieldPayload::CompressedJson(&inventory.installed_packages)));
    fields.push(("AvailableUpdates", FieldPayload::CompressedJson(&inventory.available_updates)));
    fields
}

/// JSON-encode, gzip-compress, then base64-encode a structured field
/// (spec.md §4.6: "structured fields ... are JSON-encoded, gzip-compressed,
/// base64-encoded").
fn compress_field(packages: &Packages) -> Result<String, std::io::Error> {
    let json = serde_json::to_vec(packages)?;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&json)?;
    let gzipped = encoder.finish()?;
    Ok(base64::engine::general_purpose::STANDARD.encode(gzipped))
}

/// Publish every field of `inventory` to `sink`. A failure on one field is
/// logged and does not prevent the others from being attempted.
pub async fn report(sink: &dyn AttributesSink, inventory: &InstanceInventory) {
    for (name, payload) in field_table(inventory) {
        let value = match payload {
            FieldPayload::Raw(value) => value.to_string(),
            FieldPayload::Owned(value) => value,
            FieldPayload::CompressedJson(packages) => match compress_field(packages) {
                Ok(encoded) => encoded,
                Err(err) => {
                    tracing::warn!(field = name, %err, "failed to encode structured inventory field, skipping");
                    continue;
                }
            },
        };
        if let Err(err) = sink.put_field(name, &value).await {
            tracing::warn!(field = name, %err, "failed to publish inventory field");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use osconfig_adapters::FakeAttributesSink;
    use osconfig_core::{PackageFamily, PackageInfo};

    fn sample_inventory() -> InstanceInventory {
        let mut installed = Packages::default();
        installed.set(PackageFamily::Apt, vec![PackageInfo::new("curl", "amd64", "7.0")]);
        InstanceInventory {
            hostname: "host-1".into(),
            short_name: "debian".into(),
            long_name: "Debian GNU/Linux".into(),
            os_version: "12".into(),
            kernel_version: "6.1.0".into(),
            kernel_release: "6.1.0-1-amd64".into(),
            architecture: "x86_64".into(),
            agent_version: "0.2.0".into(),
            installed_packages: installed,
            available_updates: Packages::default(),
            last_updated: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn posts_every_field_including_structured_ones() {
        let sink = FakeAttributesSink::default();
        report(&sink, &sample_inventory()).await;
        let posts = sink.posted.lock().unwrap();
        let names: Vec<&str> = posts.iter().map(|(name, _)| name.as_str()).collect();
        assert!(names.contains(&"Hostname"));
        assert!(names.contains(&"LastUpdated"));
        assert!(names.contains(&"InstalledPackages"));
        assert!(names.contains(&"AvailableUpdates"));
    }

    #[tokio::test]
    async fn structured_fields_are_base64_of_gzip_of_json() {
        let sink = FakeAttributesSink::default();
        let inventory = sample_inventory();
        report(&sink, &inventory).await;
        let posts = sink.posted.lock().unwrap();
        let (_, encoded) = posts.iter().find(|(name, _)| name == "InstalledPackages").unwrap();
        let gzipped = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(&gzipped[..]);
        let mut json = String::new();
        std::io::Read::read_to_string(&mut decoder, &mut json).unwrap();
        let decoded: Packages = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, inventory.installed_packages);
    }
}
