//! Command handlers over the core stores

use anyhow::{bail, Context, Result};
use folio_core::store::merge_fields;
use folio_core::{
    Accent, ApiClient, CertificateForm, ChangePasswordForm, DataStore, EducationForm, Entity,
    EntityForm, ExperienceForm, FileStore, FolioConfig, FolioError, FormManager, HeroEditor,
    HeroForm, HeroSection, HttpApiClient, KeyValueStore, Notification, NotificationLevel,
    Notifier, NotifyingClient, PreferenceStore, ProjectForm, PublicationForm, Resource,
    SessionStore, SkillForm, Stored, UploadFile, ValidationErrors,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Picks the form type for a collection resource; the hero arm handles
/// the singleton.
macro_rules! with_form {
    ($resource:expr, $form:ident => $body:expr, hero => $hero:expr) => {
        match $resource {
            Resource::Education => {
                type $form = EducationForm;
                $body
            }
            Resource::Experience => {
                type $form = ExperienceForm;
                $body
            }
            Resource::Skill => {
                type $form = SkillForm;
                $body
            }
            Resource::Certificate => {
                type $form = CertificateForm;
                $body
            }
            Resource::Publication => {
                type $form = PublicationForm;
                $body
            }
            Resource::Project => {
                type $form = ProjectForm;
                $body
            }
            Resource::HomeSection => $hero,
        }
    };
}

/// Prints notifications the way the dashboard toasts them
#[derive(Debug, Clone, Copy, Default)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let mark = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{mark}] {}", notification.message);
    }
}

/// Everything a command needs, wired once per invocation
pub(crate) struct App {
    client: Arc<dyn ApiClient>,
    preference: PreferenceStore,
    session: SessionStore,
    data: DataStore,
}

impl App {
    /// Load configuration and open the durable store
    pub(crate) fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => FolioConfig::load(path)?,
            None => FolioConfig::default(),
        }
        .with_env_overrides()?;

        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_file()));
        let http = HttpApiClient::new(&config, storage.clone())
            .context("failed to build the HTTP client")?;
        let client: Arc<dyn ApiClient> =
            Arc::new(NotifyingClient::new(Arc::new(http), Arc::new(ConsoleNotifier)));

        tracing::debug!(
            base = %config.api_base(),
            storage = %config.storage_file().display(),
            "opened"
        );

        Ok(Self {
            preference: PreferenceStore::load(storage.clone(), config.prefers_dark),
            session: SessionStore::new(client.clone(), storage),
            data: DataStore::new(client.clone()),
            client,
        })
    }

    pub(crate) fn theme_show(&self) -> Result<()> {
        let preference = self.preference.get();
        println!("mode:   {}", preference.mode);
        println!("accent: {}", preference.accent);
        Ok(())
    }

    pub(crate) fn theme_toggle(&self) -> Result<()> {
        println!("{}", self.preference.toggle_mode());
        Ok(())
    }

    pub(crate) fn theme_accent(&self, name: &str) -> Result<()> {
        let accent: Accent = name.parse().map_err(anyhow::Error::msg)?;
        self.preference.set_accent(accent);
        println!("{accent}");
        Ok(())
    }

    pub(crate) fn theme_tokens(&self) -> Result<()> {
        print_json(&self.preference.get().tokens())
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<()> {
        let user = self.session.login(email, password).await?;
        println!("Signed in as {} <{}>", display_name(&user.name), user.email);
        Ok(())
    }

    pub(crate) async fn register(&self, email: &str, password: &str, name: &str) -> Result<()> {
        let user = self.session.register(email, password, name).await?;
        println!("Registered {} <{}>", display_name(&user.name), user.email);
        Ok(())
    }

    pub(crate) async fn logout(&self) -> Result<()> {
        self.session.logout().await;
        println!("Signed out");
        Ok(())
    }

    pub(crate) async fn whoami(&self) -> Result<()> {
        if self.session.check_auth().await {
            if let Some(user) = self.session.user() {
                println!("{} <{}>", display_name(&user.name), user.email);
            }
        } else {
            println!("Not signed in");
        }
        Ok(())
    }

    pub(crate) async fn content(&self) -> Result<()> {
        self.data.fetch_all_data().await;
        for resource in Resource::ALL {
            if resource.is_singleton() {
                let hero = self.data.hero.current();
                println!("{:<14} {}", resource.display_name(), display_name(&hero.name));
            } else {
                println!("{:<14} {}", resource.display_name(), self.data.count(resource));
            }
        }
        Ok(())
    }

    pub(crate) async fn list(&self, resource: &str, id: Option<String>) -> Result<()> {
        let resource = parse_resource(resource)?;
        if id.is_some() {
            let record = self.client.read(resource, id).await?;
            return print_json(&record);
        }
        with_form!(resource, F => self.print_collection::<<F as EntityForm>::Entity>().await, hero => {
            self.data.hero.fetch().await;
            print_json(&self.data.hero.current())
        })
    }

    pub(crate) async fn add(&self, resource: &str, file: &Path) -> Result<()> {
        let resource = parse_resource(resource)?;
        let document = read_document(file)?;
        with_form!(resource, F => self.add_with::<F>(document).await, hero => {
            bail!("{} is a singleton; use `folio update {}`", resource.display_name(), resource)
        })
    }

    pub(crate) async fn update(&self, resource: &str, id: Option<&str>, file: &Path) -> Result<()> {
        let resource = parse_resource(resource)?;
        let document = read_document(file)?;
        with_form!(resource, F => {
            let Some(id) = id else {
                bail!("an id is required to update a {}", resource.display_name());
            };
            self.update_with::<F>(id, document).await
        }, hero => self.update_hero(document).await)
    }

    pub(crate) async fn delete(&self, resource: &str, id: &str) -> Result<()> {
        let resource = parse_resource(resource)?;
        self.data.remove(resource, id).await?;
        Ok(())
    }

    pub(crate) async fn upload(&self, path: &Path) -> Result<()> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mut file = UploadFile::new(file_name, bytes);
        if let Some(content_type) = content_type_for(path) {
            file = file.with_content_type(content_type);
        }
        let url = self.client.upload_file(file).await?;
        println!("{url}");
        Ok(())
    }

    pub(crate) async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<()> {
        let mut form = ChangePasswordForm {
            current_password: current.to_string(),
            new_password: new.to_string(),
            confirm_password: confirm.to_string(),
        };
        match form.submit(&self.session).await {
            Ok(outcome) if outcome.success => {
                println!("Password changed");
                Ok(())
            }
            Ok(_) => bail!(self
                .session
                .error()
                .unwrap_or_else(|| "Password change failed".to_string())),
            Err(errors) => Err(report(&errors)),
        }
    }

    async fn print_collection<T: Stored>(&self) -> Result<()> {
        let store = self.data.collection::<T>();
        store.fetch_all().await;
        print_json(&store.records())
    }

    async fn add_with<F: EntityForm>(&self, document: Value) -> Result<()> {
        let resource = <F::Entity as Entity>::RESOURCE;
        let entity = <F::Entity as Entity>::from_wire(document)
            .with_context(|| format!("not a valid {} record", resource.display_name()))?;

        let mut form = FormManager::<F>::new();
        form.open_new();
        *form.draft_mut() = F::from_entity(&entity);
        self.submit(&mut form).await
    }

    async fn update_with<F: EntityForm>(&self, id: &str, patch: Value) -> Result<()> {
        let resource = <F::Entity as Entity>::RESOURCE;
        let current = self.client.read(resource, Some(id.to_string())).await?;
        let current = <F::Entity as Entity>::from_wire(current)
            .with_context(|| format!("backend returned a malformed {}", resource.display_name()))?;
        let merged = merge_fields(&current, &patch)
            .with_context(|| format!("not a valid {} patch", resource.display_name()))?;

        let mut form = FormManager::<F>::new();
        form.open_edit(&merged);
        self.submit(&mut form).await
    }

    async fn update_hero(&self, patch: Value) -> Result<()> {
        self.data.hero.fetch().await;
        let merged: HeroSection = merge_fields(&self.data.hero.current(), &patch)
            .context("not a valid hero section patch")?;

        let mut editor = HeroEditor::new();
        editor.open(&self.data.hero);
        if let Some(draft) = editor.draft_mut() {
            *draft = HeroForm::from_hero(&merged);
        }
        match editor.submit(&self.data.hero).await {
            Err(FolioError::Validation(errors)) => Err(report(&errors)),
            other => Ok(other?),
        }
    }

    async fn submit<F: EntityForm>(&self, form: &mut FormManager<F>) -> Result<()> {
        match form.submit(self.data.collection::<F::Entity>()).await {
            Err(FolioError::Validation(errors)) => Err(report(&errors)),
            other => Ok(other?),
        }
    }
}

fn parse_resource(name: &str) -> Result<Resource> {
    name.parse().map_err(anyhow::Error::msg)
}

fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(errors: &ValidationErrors) -> anyhow::Error {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
    anyhow::anyhow!("{} field(s) failed validation", errors.len())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => return None,
    })
}
