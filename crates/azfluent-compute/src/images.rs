//! Popular marketplace images.

use crate::types::{ImageReference, OperatingSystemType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownLinuxImage {
    UbuntuServer2004Lts,
    UbuntuServer2204Lts,
    Debian11,
    Debian12,
    CentOs85,
    OpenSuseLeap154,
    Sles15Sp5,
    RedHatEnterprise9,
}

impl KnownLinuxImage {
    pub fn image_reference(self) -> ImageReference {
        let (publisher, offer, sku) = match self {
            Self::UbuntuServer2004Lts => ("Canonical", "0001-com-ubuntu-server-focal", "20_04-lts-gen2"),
            Self::UbuntuServer2204Lts => ("Canonical", "0001-com-ubuntu-server-jammy", "22_04-lts-gen2"),
            Self::Debian11 => ("Debian", "debian-11", "11-gen2"),
            Self::Debian12 => ("Debian", "debian-12", "12-gen2"),
            Self::CentOs85 => ("OpenLogic", "CentOS", "8_5-gen2"),
            Self::OpenSuseLeap154 => ("SUSE", "opensuse-leap-15-4", "gen2"),
            Self::Sles15Sp5 => ("SUSE", "sles-15-sp5", "gen2"),
            Self::RedHatEnterprise9 => ("RedHat", "RHEL", "9-lvm-gen2"),
        };
        ImageReference::marketplace(publisher, offer, sku, "latest")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownWindowsImage {
    WindowsServer2016Datacenter,
    WindowsServer2019Datacenter,
    WindowsServer2022Datacenter,
    WindowsServer2022DatacenterAzureEdition,
    Windows11Pro,
}

impl KnownWindowsImage {
    pub fn image_reference(self) -> ImageReference {
        let (publisher, offer, sku) = match self {
            Self::WindowsServer2016Datacenter => ("MicrosoftWindowsServer", "WindowsServer", "2016-Datacenter"),
            Self::WindowsServer2019Datacenter => ("MicrosoftWindowsServer", "WindowsServer", "2019-Datacenter"),
            Self::WindowsServer2022Datacenter => {
                ("MicrosoftWindowsServer", "WindowsServer", "2022-datacenter-g2")
            }
            Self::WindowsServer2022DatacenterAzureEdition => {
                ("MicrosoftWindowsServer", "WindowsServer", "2022-datacenter-azure-edition")
            }
            Self::Windows11Pro => ("MicrosoftWindowsDesktop", "windows-11", "win11-23h2-pro"),
        };
        ImageReference::marketplace(publisher, offer, sku, "latest")
    }
}

/// The image a VM definition boots from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ImageSource {
    /// Marketplace or custom image; the OS disk is created from it.
    Image(ImageReference, OperatingSystemType),
    /// Existing specialized OS disk attached as-is; no OS profile is sent.
    SpecializedDisk(String, OperatingSystemType),
}

impl ImageSource {
    pub(crate) fn os_type(&self) -> OperatingSystemType {
        match self {
            Self::Image(_, os) | Self::SpecializedDisk(_, os) => *os,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_images_pin_latest_version() {
        let ubuntu = KnownLinuxImage::UbuntuServer2204Lts.image_reference();
        assert_eq!(ubuntu.publisher.as_deref(), Some("Canonical"));
        assert_eq!(ubuntu.version.as_deref(), Some("latest"));
        assert!(ubuntu.id.is_none());

        let win = KnownWindowsImage::WindowsServer2019Datacenter.image_reference();
        assert_eq!(win.sku.as_deref(), Some("2019-Datacenter"));
    }
}
