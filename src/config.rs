use log::Level;
use serde::Deserialize;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Verbose console output while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Id of the optional inline JSON block that overrides `PageConfig` defaults.
pub const CONFIG_ELEMENT_ID: &str = "page-controller-config";

/// Every DOM hook, path and message the controller depends on.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub header_mount_id: String,
    pub footer_mount_id: String,
    pub header_fragment_path: String,
    pub footer_fragment_path: String,

    pub menu_toggle_selector: String,
    pub nav_selector: String,
    pub header_selector: String,
    pub anchor_selector: String,
    pub active_class: String,
    pub scroll_lock_class: String,
    pub header_fallback_offset: f64,

    pub faq_item_selector: String,
    pub faq_question_selector: String,

    pub contact_form_id: String,
    pub messages: Messages,

    pub fixed_cta_id: String,
    pub hero_id: String,
    pub cta_section_id: String,
    pub cta_fallback_margin: f64,

    pub reveal: RevealConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Messages {
    pub missing_company: String,
    pub missing_phone: String,
    pub invalid_phone: String,
    pub privacy_required: String,
    pub success: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub threshold: f64,
    pub root_margin: String,
    pub hidden_opacity: String,
    pub hidden_transform: String,
    pub transition: String,
    pub shown_opacity: String,
    pub shown_transform: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_mount_id: "header".to_string(),
            footer_mount_id: "footer".to_string(),
            header_fragment_path: "inc/header.html".to_string(),
            footer_fragment_path: "inc/footer.html".to_string(),

            menu_toggle_selector: ".mobile-toggle".to_string(),
            nav_selector: ".nav".to_string(),
            header_selector: "header".to_string(),
            anchor_selector: "a[href^=\"#\"]".to_string(),
            active_class: "active".to_string(),
            scroll_lock_class: "no-scroll".to_string(),
            header_fallback_offset: 70.0,

            faq_item_selector: ".faq-item".to_string(),
            faq_question_selector: ".faq-question".to_string(),

            contact_form_id: "contactForm".to_string(),
            messages: Messages::default(),

            fixed_cta_id: "mobileFixedCta".to_string(),
            hero_id: "hero".to_string(),
            cta_section_id: "cta".to_string(),
            cta_fallback_margin: 100.0,

            reveal: RevealConfig::default(),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_company: "회사명 또는 성함을 입력해주세요.".to_string(),
            missing_phone: "연락처를 입력해주세요.".to_string(),
            invalid_phone: "올바른 연락처 형식을 입력해주세요.".to_string(),
            privacy_required: "개인정보 수집 및 이용에 동의해주세요.".to_string(),
            success: "신청이 완료되었습니다.\n\
                      담당자가 빠른 시일 내에 연락드리겠습니다."
                .to_string(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".card, .solution-item, .process-item, .case-card, .guarantee-card"
                .to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            hidden_opacity: "0".to_string(),
            hidden_transform: "translateY(20px)".to_string(),
            transition: "opacity 0.5s ease, transform 0.5s ease".to_string(),
            shown_opacity: "1".to_string(),
            shown_transform: "translateY(0)".to_string(),
        }
    }
}

impl PageConfig {
    /// Parses an override block. Keys that are absent keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads the inline override block if the page has one, otherwise defaults.
    pub fn load(document: &web_sys::Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&text) {
            Ok(config) => {
                log::debug!("Loaded page config overrides from #{}", CONFIG_ELEMENT_ID);
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}
