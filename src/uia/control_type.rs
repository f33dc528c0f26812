use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::Error;

macro_rules! control_types {
    ($($variant:ident),+ $(,)?) => {
        /// UI Automation control types
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ControlType {
            $($variant),+
        }

        impl ControlType {
            /// All control types, in declaration order
            pub const ALL: &'static [ControlType] = &[$(ControlType::$variant),+];

            /// The PascalCase name used by UI Automation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ControlType::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

control_types!(
    Button,
    Calendar,
    CheckBox,
    ComboBox,
    Custom,
    DataGrid,
    DataItem,
    Document,
    Edit,
    Group,
    Header,
    HeaderItem,
    Hyperlink,
    Image,
    List,
    ListItem,
    Menu,
    MenuBar,
    MenuItem,
    Pane,
    ProgressBar,
    RadioButton,
    ScrollBar,
    Separator,
    Slider,
    Spinner,
    SplitButton,
    StatusBar,
    Tab,
    TabItem,
    Table,
    Text,
    Thumb,
    TitleBar,
    ToolBar,
    ToolTip,
    Tree,
    TreeItem,
    Window,
);

impl ControlType {
    /// Item types that make up the rows of grids, lists and trees
    pub fn is_item(&self) -> bool {
        matches!(
            self,
            ControlType::DataItem | ControlType::ListItem | ControlType::TreeItem
        )
    }

    /// Types exposing an editable text value
    pub fn is_text_input(&self) -> bool {
        matches!(self, ControlType::Edit | ControlType::ComboBox)
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("unknown control type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("TabItem".parse::<ControlType>().unwrap(), ControlType::TabItem);
        assert_eq!("tabitem".parse::<ControlType>().unwrap(), ControlType::TabItem);
        assert!("Widget".parse::<ControlType>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        let yaml = serde_yaml::to_string(&ControlType::MenuItem).unwrap();
        assert_eq!(yaml.trim(), ControlType::MenuItem.to_string());
    }
}
