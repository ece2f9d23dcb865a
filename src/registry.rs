//! # Metadata Type Registry
//!
//! Static description of how each Metadata API type is laid out on disk.
//! Every other component consults this table: the manifest merger does not,
//! but the scanner uses it to turn folders into type names and the filter
//! engine uses it to turn member names back into files.
//!
//! The table is closed. A type missing from it is unsupported and consumers
//! skip it with a debug log.
//!
//! ## Storage kinds
//!
//! - [`Storage::Directory`]: one file (or folder) per member under a folder,
//!   found by trying each suffix in order.
//! - [`Storage::ObjectFile`]: `CustomObject`, stored as `objects/<Name>.object`.
//!   Its content can be pruned by the fragment types below.
//! - [`Storage::ObjectFragment`]: members live inside `.object` files as
//!   repeated child elements (fields, record types, ...).
//! - [`Storage::Translation`]: files are copied like a directory type and the
//!   member names are also language codes driving `.objectTranslation`
//!   filtering.
//! - [`Storage::LabelFile`]: members are `<labels>` entries of the single
//!   aggregate labels file.

/// Folder holding `.object` files in Metadata API format and object folders
/// in source format.
pub const OBJECTS_FOLDER: &str = "objects";

/// Suffix of a Metadata API format custom object file.
pub const OBJECT_SUFFIX: &str = ".object";

/// Folder holding object translation files.
pub const OBJECT_TRANSLATIONS_FOLDER: &str = "objectTranslations";

/// Suffix of an object translation file.
pub const OBJECT_TRANSLATION_SUFFIX: &str = ".objectTranslation";

/// Folder holding the aggregate custom labels file.
pub const LABELS_FOLDER: &str = "labels";

/// Suffix marking a side-car metadata file.
pub const META_XML_SUFFIX: &str = "-meta.xml";

/// Wildcard member meaning "every member of this type".
pub const WILDCARD: &str = "*";

/// Type name registered for custom object folders found by the scanner.
pub const CUSTOM_OBJECT_TYPE: &str = "CustomObject";

/// Type name of individual custom labels.
pub const CUSTOM_LABEL_TYPE: &str = "CustomLabel";

/// Types whose members live in named sub-folders (`Folder/Member`).
pub const FOLDERED_TYPES: &[&str] = &["Dashboard", "Document", "EmailTemplate", "Report"];

/// Name suffixes identifying non-standard objects.
pub const CUSTOM_OBJECT_NAME_SUFFIXES: &[&str] = &["__c", "__mdt", "__e", "__b", "__x"];

/// How the members of a metadata type are materialized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// One file or folder per member, found as `folder/member + suffix`.
    Directory {
        folder: &'static str,
        suffixes: &'static [&'static str],
    },
    /// Whole `.object` files under [`OBJECTS_FOLDER`].
    ObjectFile,
    /// Fragments of `.object` files.
    ObjectFragment,
    /// Files copied like a directory type; members are language codes.
    Translation {
        folder: &'static str,
        suffixes: &'static [&'static str],
    },
    /// Entries of a single aggregate file.
    LabelFile {
        folder: &'static str,
        file: &'static str,
    },
}

/// On-disk description of one metadata type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataTypeDescriptor {
    /// Metadata API type name as used in manifests
    pub name: &'static str,
    /// How members of this type are stored
    pub storage: Storage,
}

impl MetadataTypeDescriptor {
    const fn dir(
        name: &'static str,
        folder: &'static str,
        suffixes: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            storage: Storage::Directory { folder, suffixes },
        }
    }

    const fn fragment(name: &'static str) -> Self {
        Self {
            name,
            storage: Storage::ObjectFragment,
        }
    }

    /// Folder under the project root holding this type's files, if any.
    pub fn folder(&self) -> Option<&'static str> {
        match self.storage {
            Storage::Directory { folder, .. }
            | Storage::Translation { folder, .. }
            | Storage::LabelFile { folder, .. } => Some(folder),
            Storage::ObjectFile => Some(OBJECTS_FOLDER),
            Storage::ObjectFragment => None,
        }
    }

    /// Suffixes tried, in order, when locating a member's files.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self.storage {
            Storage::Directory { suffixes, .. } | Storage::Translation { suffixes, .. } => {
                suffixes
            }
            Storage::ObjectFile => &[OBJECT_SUFFIX],
            Storage::LabelFile { .. } => &[".labels"],
            Storage::ObjectFragment => &[],
        }
    }

    /// Whether members are grouped in sub-folders, e.g. `Folder/Report`.
    pub fn is_foldered(&self) -> bool {
        FOLDERED_TYPES.contains(&self.name)
    }

    /// Whether members of this type are resolved against `.object` files.
    pub fn is_object_related(&self) -> bool {
        matches!(self.storage, Storage::ObjectFile | Storage::ObjectFragment)
    }
}

/// Returns true when a suffix designates a side-car metadata file.
///
/// Side-cars are copied along with their member but are not counted as a
/// separate copy.
pub fn is_meta_sidecar(suffix: &str) -> bool {
    suffix.ends_with(META_XML_SUFFIX)
}

/// One kind of repeated child element inside `.object` and
/// `.objectTranslation` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SObjectFragmentDescriptor {
    /// Element name of each fragment, also the source-format sub-folder name
    pub element: &'static str,
    /// Manifest type name of the fragments
    pub type_name: &'static str,
    /// Child element holding the fragment name in `.object` files
    pub name_field: &'static str,
    /// Child element holding the fragment name in `.objectTranslation` files
    pub translation_name_field: &'static str,
    /// Separator between object name and fragment name in member names
    pub separator: char,
    /// Whether the fragment kind appears in `.object` files
    pub in_object_file: bool,
    /// File suffix of one fragment in source format
    pub source_suffix: &'static str,
}

impl SObjectFragmentDescriptor {
    const fn object(
        element: &'static str,
        type_name: &'static str,
        source_suffix: &'static str,
    ) -> Self {
        Self {
            element,
            type_name,
            name_field: "fullName",
            translation_name_field: "name",
            separator: '.',
            in_object_file: true,
            source_suffix,
        }
    }

    /// Split a member name into `(object, fragment)`.
    ///
    /// Returns `None` for whole-object references without a separator.
    pub fn split_member<'a>(&self, member: &'a str) -> Option<(&'a str, &'a str)> {
        member.split_once(self.separator)
    }
}

static METADATA_TYPES: &[MetadataTypeDescriptor] = &[
    MetadataTypeDescriptor::dir("ApexClass", "classes", &[".cls", ".cls-meta.xml"]),
    MetadataTypeDescriptor::dir(
        "ApexComponent",
        "components",
        &[".component", ".component-meta.xml"],
    ),
    MetadataTypeDescriptor::dir("ApexPage", "pages", &[".page", ".page-meta.xml"]),
    MetadataTypeDescriptor::dir(
        "ApexTrigger",
        "triggers",
        &[".trigger", ".trigger-meta.xml"],
    ),
    MetadataTypeDescriptor::dir("AppMenu", "appMenus", &[".appMenu"]),
    MetadataTypeDescriptor::dir(
        "ApprovalProcess",
        "approvalProcesses",
        &[".approvalProcess"],
    ),
    MetadataTypeDescriptor::dir("AssignmentRules", "assignmentRules", &[".assignmentRules"]),
    MetadataTypeDescriptor::dir("AuraDefinitionBundle", "aura", &[""]),
    MetadataTypeDescriptor::dir("AuthProvider", "authproviders", &[".authprovider"]),
    MetadataTypeDescriptor::dir(
        "AutoResponseRules",
        "autoResponseRules",
        &[".autoResponseRules"],
    ),
    MetadataTypeDescriptor::dir("Bot", "bots", &[".bot"]),
    MetadataTypeDescriptor::fragment("BusinessProcess"),
    MetadataTypeDescriptor::dir("CallCenter", "callCenters", &[".callCenter"]),
    MetadataTypeDescriptor::dir("Certificate", "certs", &[".crt", ".crt-meta.xml"]),
    MetadataTypeDescriptor::dir(
        "CleanDataService",
        "cleanDataServices",
        &[".cleanDataService"],
    ),
    MetadataTypeDescriptor::dir("Community", "communities", &[".community"]),
    MetadataTypeDescriptor::fragment("CompactLayout"),
    MetadataTypeDescriptor::dir("ConnectedApp", "connectedApps", &[".connectedApp"]),
    MetadataTypeDescriptor::dir(
        "ContentAsset",
        "contentassets",
        &[".asset", ".asset-meta.xml"],
    ),
    MetadataTypeDescriptor::dir("CustomApplication", "applications", &[".app"]),
    MetadataTypeDescriptor::dir(
        "CustomApplicationComponent",
        "customApplicationComponents",
        &[".customApplicationComponent"],
    ),
    MetadataTypeDescriptor::fragment("CustomField"),
    MetadataTypeDescriptor {
        name: CUSTOM_LABEL_TYPE,
        storage: Storage::LabelFile {
            folder: LABELS_FOLDER,
            file: "CustomLabels.labels",
        },
    },
    MetadataTypeDescriptor::dir("CustomLabels", LABELS_FOLDER, &[".labels"]),
    MetadataTypeDescriptor::dir("CustomMetadata", "customMetadata", &[".md"]),
    MetadataTypeDescriptor {
        name: CUSTOM_OBJECT_TYPE,
        storage: Storage::ObjectFile,
    },
    MetadataTypeDescriptor::dir(
        "CustomObjectTranslation",
        OBJECT_TRANSLATIONS_FOLDER,
        &[OBJECT_TRANSLATION_SUFFIX],
    ),
    MetadataTypeDescriptor::dir("CustomPageWebLink", "weblinks", &[".weblink"]),
    MetadataTypeDescriptor::dir(
        "CustomPermission",
        "customPermissions",
        &[".customPermission"],
    ),
    MetadataTypeDescriptor::dir("CustomSite", "sites", &[".site"]),
    MetadataTypeDescriptor::dir("CustomTab", "tabs", &[".tab"]),
    MetadataTypeDescriptor::dir("Dashboard", "dashboards", &["", ".dashboard", "-meta.xml"]),
    MetadataTypeDescriptor::dir(
        "DataCategoryGroup",
        "datacategorygroups",
        &[".datacategorygroup"],
    ),
    MetadataTypeDescriptor::dir("DelegateGroup", "delegateGroups", &[".delegateGroup"]),
    MetadataTypeDescriptor::dir("Document", "documents", &["", "-meta.xml"]),
    MetadataTypeDescriptor::dir("DuplicateRule", "duplicateRules", &[".duplicateRule"]),
    MetadataTypeDescriptor::dir("EmailTemplate", "email", &["", ".email", ".email-meta.xml"]),
    MetadataTypeDescriptor::dir(
        "EscalationRules",
        "escalationRules",
        &[".escalationRules"],
    ),
    MetadataTypeDescriptor::dir("ExternalDataSource", "dataSources", &[".dataSource"]),
    MetadataTypeDescriptor::fragment("FieldSet"),
    MetadataTypeDescriptor::dir("FlexiPage", "flexipages", &[".flexipage"]),
    MetadataTypeDescriptor::dir("Flow", "flows", &[".flow"]),
    MetadataTypeDescriptor::dir("FlowCategory", "flowCategories", &[".flowCategory"]),
    MetadataTypeDescriptor::dir("FlowDefinition", "flowDefinitions", &[".flowDefinition"]),
    MetadataTypeDescriptor::dir("GlobalValueSet", "globalValueSets", &[".globalValueSet"]),
    MetadataTypeDescriptor::dir(
        "GlobalValueSetTranslation",
        "globalValueSetTranslations",
        &[".globalValueSetTranslation"],
    ),
    MetadataTypeDescriptor::dir("Group", "groups", &[".group"]),
    MetadataTypeDescriptor::dir(
        "HomePageComponent",
        "homePageComponents",
        &[".homePageComponent"],
    ),
    MetadataTypeDescriptor::dir("HomePageLayout", "homePageLayouts", &[".homePageLayout"]),
    MetadataTypeDescriptor::dir(
        "InstalledPackage",
        "installedPackages",
        &[".installedPackage"],
    ),
    MetadataTypeDescriptor::dir("Layout", "layouts", &[".layout"]),
    MetadataTypeDescriptor::dir(
        "LeadConvertSettings",
        "LeadConvertSettings",
        &[".LeadConvertSetting"],
    ),
    MetadataTypeDescriptor::dir("Letterhead", "letterhead", &[".letter"]),
    MetadataTypeDescriptor::dir("LightningComponentBundle", "lwc", &[""]),
    MetadataTypeDescriptor::fragment("ListView"),
    MetadataTypeDescriptor::dir("MatchingRules", "matchingRules", &[".matchingRule"]),
    MetadataTypeDescriptor::dir(
        "NamedCredential",
        "namedCredentials",
        &[".namedCredential"],
    ),
    MetadataTypeDescriptor::dir("Network", "networks", &[".network"]),
    MetadataTypeDescriptor::dir("PathAssistant", "pathAssistants", &[".pathAssistant"]),
    MetadataTypeDescriptor::dir("PermissionSet", "permissionsets", &[".permissionset"]),
    MetadataTypeDescriptor::dir(
        "PlatformCachePartition",
        "cachePartitions",
        &[".cachePartition"],
    ),
    MetadataTypeDescriptor::dir(
        "PlatformEventChannel",
        "platformEventChannels",
        &[".platformEventChannel"],
    ),
    MetadataTypeDescriptor::dir("Profile", "profiles", &[".profile"]),
    MetadataTypeDescriptor::dir(
        "ProfilePasswordPolicy",
        "profilePasswordPolicies",
        &[".profilePasswordPolicy"],
    ),
    MetadataTypeDescriptor::dir(
        "ProfileSessionSetting",
        "profileSessionSettings",
        &[".profileSessionSetting"],
    ),
    MetadataTypeDescriptor::dir("Queue", "queues", &[".queue"]),
    MetadataTypeDescriptor::dir("QuickAction", "quickActions", &[".quickAction"]),
    MetadataTypeDescriptor::fragment("RecordType"),
    MetadataTypeDescriptor::dir(
        "RemoteSiteSetting",
        "remoteSiteSettings",
        &[".remoteSite"],
    ),
    MetadataTypeDescriptor::dir("Report", "reports", &["", ".report", "-meta.xml"]),
    MetadataTypeDescriptor::dir("ReportType", "reportTypes", &[".reportType"]),
    MetadataTypeDescriptor::dir("Role", "roles", &[".role"]),
    MetadataTypeDescriptor::dir("Settings", "settings", &[".settings"]),
    MetadataTypeDescriptor::dir("SharingRules", "sharingRules", &[".sharingRules"]),
    MetadataTypeDescriptor::dir(
        "SiteDotCom",
        "siteDotComSites",
        &[".site", ".site-meta.xml"],
    ),
    MetadataTypeDescriptor::dir(
        "StandardValueSet",
        "standardValueSets",
        &[".standardValueSet"],
    ),
    MetadataTypeDescriptor::dir(
        "StandardValueSetTranslation",
        "standardValueSetTranslations",
        &[".standardValueSetTranslation"],
    ),
    MetadataTypeDescriptor::dir(
        "StaticResource",
        "staticresources",
        &[".resource", ".resource-meta.xml"],
    ),
    MetadataTypeDescriptor {
        name: "Translations",
        storage: Storage::Translation {
            folder: "translations",
            suffixes: &[".translation"],
        },
    },
    MetadataTypeDescriptor::fragment("ValidationRule"),
    MetadataTypeDescriptor::fragment("WebLink"),
    MetadataTypeDescriptor::dir("Workflow", "workflows", &[".workflow"]),
];

static OBJECT_FRAGMENT_TYPES: &[SObjectFragmentDescriptor] = &[
    SObjectFragmentDescriptor::object(
        "businessProcesses",
        "BusinessProcess",
        ".businessProcess-meta.xml",
    ),
    SObjectFragmentDescriptor::object(
        "compactLayouts",
        "CompactLayout",
        ".compactLayout-meta.xml",
    ),
    SObjectFragmentDescriptor::object("fields", "CustomField", ".field-meta.xml"),
    SObjectFragmentDescriptor::object("fieldSets", "FieldSet", ".fieldSet-meta.xml"),
    SObjectFragmentDescriptor {
        element: "layouts",
        type_name: "Layout",
        name_field: "fullName",
        translation_name_field: "layout",
        separator: '-',
        in_object_file: false,
        source_suffix: ".layout-meta.xml",
    },
    SObjectFragmentDescriptor::object("listViews", "ListView", ".listView-meta.xml"),
    SObjectFragmentDescriptor::object("recordTypes", "RecordType", ".recordType-meta.xml"),
    SObjectFragmentDescriptor::object(
        "validationRules",
        "ValidationRule",
        ".validationRule-meta.xml",
    ),
    SObjectFragmentDescriptor::object("webLinks", "WebLink", ".webLink-meta.xml"),
];

/// Source-format side-car of a type whose member owns one content file with
/// an arbitrary extension, e.g. `logo.png` next to `logo.document-meta.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSidecar {
    /// Manifest type name
    pub type_name: &'static str,
    /// Side-car suffix; the member's stem is what precedes it
    pub suffix: &'static str,
    /// Whether the member name is the content file name, extension included
    pub member_keeps_extension: bool,
}

static CONTENT_SIDECARS: &[ContentSidecar] = &[
    ContentSidecar {
        type_name: "Document",
        suffix: ".document-meta.xml",
        member_keeps_extension: true,
    },
    ContentSidecar {
        type_name: "StaticResource",
        suffix: ".resource-meta.xml",
        member_keeps_extension: false,
    },
];

/// Look up the content side-car convention of a type, if it has one.
pub fn find_content_sidecar(type_name: &str) -> Option<&'static ContentSidecar> {
    CONTENT_SIDECARS
        .iter()
        .find(|sidecar| sidecar.type_name == type_name)
}

/// Every supported metadata type, sorted by name.
pub fn describe_metadata_types() -> &'static [MetadataTypeDescriptor] {
    METADATA_TYPES
}

/// Every fragment kind of `.object` / `.objectTranslation` files.
pub fn describe_object_fragment_types() -> &'static [SObjectFragmentDescriptor] {
    OBJECT_FRAGMENT_TYPES
}

/// Look up a type by its manifest name.
pub fn find_type(name: &str) -> Option<&'static MetadataTypeDescriptor> {
    METADATA_TYPES
        .binary_search_by(|desc| desc.name.cmp(name))
        .ok()
        .map(|idx| &METADATA_TYPES[idx])
}

/// Look up the directory-backed type stored in `folder`.
///
/// Only [`Storage::Directory`] and [`Storage::Translation`] types are
/// considered: objects and labels need dedicated handling.
pub fn find_type_by_folder(folder: &str) -> Option<&'static MetadataTypeDescriptor> {
    METADATA_TYPES.iter().find(|desc| {
        matches!(
            desc.storage,
            Storage::Directory { folder: f, .. } | Storage::Translation { folder: f, .. } if f == folder
        )
    })
}

/// Look up the fragment kind stored in the source-format sub-folder `folder`.
pub fn find_fragment_by_folder(folder: &str) -> Option<&'static SObjectFragmentDescriptor> {
    OBJECT_FRAGMENT_TYPES
        .iter()
        .find(|frag| frag.in_object_file && frag.element == folder)
}

/// Look up the fragment kind whose members use manifest type `type_name`.
pub fn find_fragment_by_type(type_name: &str) -> Option<&'static SObjectFragmentDescriptor> {
    OBJECT_FRAGMENT_TYPES
        .iter()
        .find(|frag| frag.type_name == type_name)
}

/// Whether an object name designates a custom object, metadata type,
/// platform event, big object or external object.
pub fn is_custom_object_name(name: &str) -> bool {
    CUSTOM_OBJECT_NAME_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_sorted_and_unique() {
        // find_type relies on binary search
        for pair in METADATA_TYPES.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "{} must sort before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_find_type_apex_class() {
        let desc = find_type("ApexClass").unwrap();
        assert_eq!(desc.folder(), Some("classes"));
        assert_eq!(desc.suffixes(), &[".cls", ".cls-meta.xml"]);
        assert!(!desc.is_object_related());
    }

    #[test]
    fn test_find_type_unknown() {
        assert!(find_type("NotAType").is_none());
    }

    #[test]
    fn test_fragment_types_have_no_folder() {
        for name in ["CustomField", "RecordType", "ListView", "WebLink"] {
            let desc = find_type(name).unwrap();
            assert_eq!(desc.storage, Storage::ObjectFragment);
            assert_eq!(desc.folder(), None);
            assert!(desc.is_object_related());
            assert!(find_fragment_by_type(name).is_some());
        }
    }

    #[test]
    fn test_every_fragment_type_is_registered() {
        for frag in describe_object_fragment_types() {
            assert!(
                find_type(frag.type_name).is_some(),
                "{} missing from the type table",
                frag.type_name
            );
        }
    }

    #[test]
    fn test_find_type_by_folder() {
        assert_eq!(find_type_by_folder("classes").unwrap().name, "ApexClass");
        assert_eq!(find_type_by_folder("lwc").unwrap().name, "LightningComponentBundle");
        assert_eq!(find_type_by_folder("translations").unwrap().name, "Translations");
        assert!(find_type_by_folder(OBJECTS_FOLDER).is_none());
        assert!(find_type_by_folder("unknownFolder").is_none());
    }

    #[test]
    fn test_find_fragment_by_folder_skips_layouts() {
        assert_eq!(find_fragment_by_folder("fields").unwrap().type_name, "CustomField");
        assert!(find_fragment_by_folder("layouts").is_none());
    }

    #[test]
    fn test_split_member() {
        let field = find_fragment_by_type("CustomField").unwrap();
        assert_eq!(field.split_member("Account.Rating__c"), Some(("Account", "Rating__c")));
        assert_eq!(field.split_member("Account"), None);

        let layout = find_fragment_by_type("Layout").unwrap();
        assert_eq!(
            layout.split_member("Account-Account Layout"),
            Some(("Account", "Account Layout"))
        );
    }

    #[test]
    fn test_meta_sidecar() {
        assert!(is_meta_sidecar(".cls-meta.xml"));
        assert!(is_meta_sidecar("-meta.xml"));
        assert!(!is_meta_sidecar(".cls"));
        assert!(!is_meta_sidecar(""));
    }

    #[test]
    fn test_content_sidecars_are_registered() {
        for sidecar in CONTENT_SIDECARS {
            assert!(find_type(sidecar.type_name).is_some());
            assert!(is_meta_sidecar(sidecar.suffix));
        }
        assert_eq!(
            find_content_sidecar("StaticResource").map(|s| s.suffix),
            Some(".resource-meta.xml")
        );
        assert!(find_content_sidecar("ApexClass").is_none());
    }

    #[test]
    fn test_custom_object_names() {
        assert!(is_custom_object_name("Invoice__c"));
        assert!(is_custom_object_name("Settings__mdt"));
        assert!(is_custom_object_name("Order_Event__e"));
        assert!(!is_custom_object_name("Account"));
    }
}
