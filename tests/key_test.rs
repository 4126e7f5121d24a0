use vidthumb::cache::key::KEY_PREFIX;
use vidthumb::{CacheKey, OutputFormat, derive_key};

#[test]
fn empty_locator_hashes_empty_string() {
    assert_eq!(
        derive_key("", "jpeg"),
        "thumb-d41d8cd98f00b204e9800998ecf8427e.jpeg"
    );
}

#[test]
fn key_is_prefix_hex_digest_and_extension() {
    let key = derive_key("https://example.com/clip.mp4", "png");
    let digest = key
        .strip_prefix(KEY_PREFIX)
        .and_then(|rest| rest.strip_suffix(".png"))
        .unwrap();
    assert_eq!(digest.len(), 32);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn cache_key_matches_free_function() {
    let locator = "file:///sdcard/DCIM/a.mp4";
    let key = CacheKey::derive(locator, OutputFormat::Jpeg);
    assert_eq!(key.as_str(), derive_key(locator, "jpeg"));
    assert_eq!(key.to_string(), key.as_str());
}

#[test]
fn scheme_is_part_of_the_key() {
    assert_ne!(
        derive_key("file:///sdcard/a.mp4", "jpeg"),
        derive_key("/sdcard/a.mp4", "jpeg")
    );
}

#[test]
fn non_ascii_locators_hash_their_utf8_bytes() {
    let a = derive_key("https://example.com/vidéo.mp4", "jpeg");
    let b = derive_key("https://example.com/video.mp4", "jpeg");
    assert_ne!(a, b);
    assert_eq!(a, derive_key("https://example.com/vidéo.mp4", "jpeg"));
}
