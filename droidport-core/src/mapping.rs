use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PortError, Result};

/// Known source bundle id -> target package id pairs.
const BUILTIN: &[(&str, &str)] = &[
    ("com.amazon.Amazon", "com.amazon.mShop.android.shopping"),
    ("com.facebook.Facebook", "com.facebook.katana"),
    ("com.twitter.twitter", "com.twitter.android"),
    ("com.instagram", "com.instagram.android"),
    ("com.spotify.client", "com.spotify.music"),
    ("com.google.Maps", "com.google.android.apps.maps"),
    ("com.netflix.Netflix", "com.netflix.mediaclient"),
    ("com.snapchat.Snapchat", "com.snapchat.android"),
    ("com.youtube", "com.google.android.youtube"),
    ("org.telegram.telegram", "org.telegram.messenger"),
    ("com.slack.Slack", "com.Slack"),
    ("com.adobe.Adobe-Reader", "com.adobe.reader"),
    ("pinterest", "com.pinterest.android"),
    ("com.linkedin.LinkedIn", "com.linkedin.android"),
    ("com.ebay.iphone", "com.ebay.mobile"),
    ("com.spotify.Remote", "com.spotify.music"),
    ("com.dropbox.Dropbox", "com.getdropbox.android"),
    ("com.soundcloud.SoundCloud", "com.soundcloud.android"),
    ("com.pandora", "com.pandora.android"),
    ("com.yelp.yelp", "com.yelp.android"),
    ("com.foursquare.Foursquare", "com.foursquare.foursquareapp"),
    ("com.canva.canvaeditor", "com.canva.editor"),
    ("com.github.stormbreaker.prod", "com.github.android"),
    ("com.google.GoogleMobile", "com.google.android.googlequicksearchbox"),
    ("com.shazam.Shazam", "com.shazam.android"),
    ("org.ppsspp.ppsspp-free", "org.ppsspp.ppsspp"),
    ("com.google.GVDialer", "com.google.android.apps.googlevoice"),
    ("com.dcdwebdesign.saturn", "com.joinsaturn.android1"),
    ("com.microsoft.Office.Outlook", "com.microsoft.office.outlook"),
    ("net.techet.netanalyzerlite", "net.techet.netanalyzerlite.an"),
    ("com.asus.asusrouter", "com.asus.aihome"),
    ("com.authy", "com.authy.authy"),
    ("ch.protonmail.vpn", "ch.protonvpn.android"),
    ("com.openai.chat", "com.openai.chatgpt"),
    ("com.google.Drive", "com.google.android.apps.docs"),
    ("com.google.Gmail", "com.google.android.gm"),
    ("com.amazon.aiv.AIVApp", "com.amazon.avod.thirdpartyclient"),
    ("com.google.Docs", "com.google.android.apps.docs.editors.docs"),
    ("com.google.youtube", "com.google.android.youtube"),
    ("com.atebits.Tweetie2", "com.twitter.android"),
    ("com.utmapp.UTM-SE", "com.google.android.apps.maps"),
    ("com.cloudflare.1dot1dot1dot1", "com.cloudflare.onedotonedotonedotone"),
    ("com.crystalnix.ServerAuditor", "com.server.auditor.ssh.client"),
    ("com.supercell.soil", "com.supercell.hayday"),
    ("com.burbn.instagram", "com.instagram.android"),
    ("com.nanoleaf.nanoleaf", "me.nanoleaf.nanoleaf"),
    ("com.wireguard", "com.wireguard.android"),
    ("com.amazon.echo", "com.amazon.dee.app"),
    ("com.google.photos", "com.google.android.apps.photos"),
    ("com.edupoint.StudentVUE", "com.FreeLance.StudentVUE"),
    ("com.toyopagroup.picaboo", "com.snapchat.android"),
    ("com.reddit.Reddit", "com.reddit.frontpage"),
    ("com.valvesoftware.Steam", "com.valvesoftware.android.steam.community"),
    ("com.google.youtubemusic", "com.google.android.apps.youtube.music"),
];

/// Immutable lookup table handed to the restore orchestrator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppIdentifierMapping {
    table: BTreeMap<String, String>,
}

impl AppIdentifierMapping {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// New table with `overrides` layered on top; later entries win.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (k, v) in overrides {
            self.table.insert(k.clone(), v.clone());
        }
        self
    }

    /// Layer a JSON object file (`{"source.id": "target.id", ...}`) on top.
    pub fn with_overrides_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PortError::Config(format!("mapping file {}: {e}", path.display())))?;
        let overrides: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        Ok(self.with_overrides(&overrides))
    }

    pub fn resolve(&self, source_bundle_id: &str) -> Option<&str> {
        self.table.get(source_bundle_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_known_ids() {
        let m = AppIdentifierMapping::builtin();
        assert_eq!(m.resolve("com.burbn.instagram"), Some("com.instagram.android"));
        assert_eq!(m.resolve("com.example.unknown"), None);
        assert_eq!(m.len(), BUILTIN.len());
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut extra = BTreeMap::new();
        extra.insert("com.burbn.instagram".to_string(), "x.y".to_string());
        extra.insert("com.example.app".to_string(), "com.example.android".to_string());
        let m = AppIdentifierMapping::builtin().with_overrides(&extra);
        assert_eq!(m.resolve("com.burbn.instagram"), Some("x.y"));
        assert_eq!(m.resolve("com.example.app"), Some("com.example.android"));
    }

    #[test]
    fn overrides_file_is_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{"com.example.app": "com.example.android"}"#).unwrap();
        let m = AppIdentifierMapping::empty()
            .with_overrides_file(&path)
            .unwrap();
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(
            "com.example.app",
            "com.example.android"
        )]);

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            AppIdentifierMapping::empty().with_overrides_file(&path),
            Err(PortError::Json(_))
        ));
    }
}
