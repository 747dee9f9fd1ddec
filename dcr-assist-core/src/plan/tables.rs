//! Hand-tuned script lists and substitution tables.
//!
//! The tables are not derivable from each other: templates for each
//! generation use different placeholder tokens and the multi-party variants
//! rely on a precise replacement order. Keep every table literal.

use super::{
    AccountType, Operation, PlanRequest, PlanStep, ProtocolVersion, ScriptPlan,
    SessionRole::{AccountUnderOperation as X, Consumer as C, Provider as P},
    SubstitutionTable,
};
use crate::error::PlanError;

pub(super) type TableBuilder =
    fn(&PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError>;

const V6_ABBREVIATION: &str = "demo";
const V55_ABBREVIATION: &str = "samp";
const APP_SUFFIX: &str = "two";

const DEPLOY_V6: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
    PlanStep::new("provider_ml", P),
    PlanStep::new("consumer_ml", C),
];

const DEPLOY_V55_JINJA: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates_jinja", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
];

const DEPLOY_V55_SQL_PARAM: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates_js", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
];

const ADD_CONSUMER_V6: &[PlanStep] = &[
    PlanStep::new("provider_init_new_consumer", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
    PlanStep::new("provider_ml", P),
    PlanStep::new("consumer_ml", C),
];

const ADD_CONSUMER_V55_JINJA: &[PlanStep] = &[
    PlanStep::new("provider_templates_jinja", P),
    PlanStep::new("provider_add_consumer_to_share", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
];

const ADD_CONSUMER_V55_SQL_PARAM: &[PlanStep] = &[
    PlanStep::new("provider_templates_js", P),
    PlanStep::new("provider_add_consumer_to_share", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
];

const ADD_PROVIDER_V6: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates", P),
    PlanStep::new("consumer_init_new_provider", C),
    PlanStep::new("provider_enable_consumer", P),
    PlanStep::new("provider_ml", P),
    PlanStep::new("consumer_ml", C),
];

const ADD_PROVIDER_V55_JINJA: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates_jinja", P),
    PlanStep::new("consumer_init_new_provider", C),
    PlanStep::new("provider_enable_consumer", P),
];

const ADD_PROVIDER_V55_SQL_PARAM: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_templates_js", P),
    PlanStep::new("consumer_init_new_provider", C),
    PlanStep::new("provider_enable_consumer", P),
];

const UPGRADE_V6: &[PlanStep] = &[
    PlanStep::new("provider_init", P),
    PlanStep::new("provider_upgrade", P),
    PlanStep::new("consumer_init", C),
    PlanStep::new("provider_enable_consumer", P),
    PlanStep::new("provider_ml", P),
    PlanStep::new("consumer_ml", C),
];

const UNINSTALL_PROVIDER: &[PlanStep] = &[PlanStep::new("provider_uninstall", X)];
const UNINSTALL_CONSUMER: &[PlanStep] = &[PlanStep::new("consumer_uninstall", X)];

/// Maps an (operation, version) pair to the function that builds its tables.
pub(super) fn table_builder(operation: Operation, version: ProtocolVersion) -> TableBuilder {
    use Operation::*;
    use ProtocolVersion::*;

    match (operation, version) {
        (Upgrade, _) => upgrade_v6,
        (_, IdResolutionNativeApp) => not_automated,
        (Deploy, V6NativeApp) => deploy_v6,
        (Deploy, V55Jinja) => deploy_v55_jinja,
        (Deploy, V55SqlParam) => deploy_v55_sql_param,
        (AddConsumer, V6NativeApp) => add_consumer_v6,
        (AddConsumer, V55Jinja) => add_consumer_v55_jinja,
        (AddConsumer, V55SqlParam) => add_consumer_v55_sql_param,
        (AddProvider, V6NativeApp) => add_provider_v6,
        (AddProvider, V55Jinja) => add_provider_v55_jinja,
        (AddProvider, V55SqlParam) => add_provider_v55_sql_param,
        (Uninstall, V6NativeApp) => uninstall_v6,
        (Uninstall, V55Jinja | V55SqlParam) => uninstall_v55,
    }
}

fn not_automated(_: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    Ok((ScriptPlan::default(), SubstitutionTable::new()))
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

fn token(abbreviation: &str) -> String {
    format!("_{abbreviation}_")
}

/// Rewrites the 5.5 template-engine entry points from the JavaScript UDF to
/// the Jinja procedure. Must run before the `_samp_` replacement.
fn jinja_rewrites(table: SubstitutionTable) -> SubstitutionTable {
    table
        .with(
            "select dcr_samp_app.cleanroom.get_sql_js(",
            "select dcr_samp_consumer.util.get_sql_jinja(",
        )
        .with(
            "select dcr_samp_provider_db.cleanroom.get_sql_js(",
            "select dcr_samp_provider_db.templates.get_sql_jinja(",
        )
        .with(
            "dcr_samp_provider_db.cleanroom.get_sql_js(template, request_params) as valid_sql",
            "dcr_samp_provider_db.templates.get_sql_jinja(template, request_params) as valid_sql",
        )
}

fn v55_accounts(
    table: SubstitutionTable,
    provider: &str,
    consumer: &str,
    abbreviation: &str,
) -> SubstitutionTable {
    let abbreviation = token(abbreviation);
    table
        .with("PROVIDER_ACCT", provider)
        .with("provider_acct", provider)
        .with("CONSUMER_ACCT", consumer)
        .with("consumer_acct", consumer)
        .with("_SAMP_", abbreviation.as_str())
        .with("_samp_", abbreviation)
}

fn deploy_v6(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let provider = request.accounts.provider.as_str();
    let consumer = request.accounts.consumer.as_str();
    let abbreviation = token(or_default(&request.abbreviation, V6_ABBREVIATION));

    let table = SubstitutionTable::new()
        .with("SNOWCAT2", provider)
        .with("snowcat2", provider)
        .with("SNOWCAT", consumer)
        .with("snowcat", consumer)
        .with("_DEMO_", abbreviation.as_str())
        .with("_demo_", abbreviation);
    Ok((ScriptPlan::new(DEPLOY_V6), table))
}

fn deploy_v55_jinja(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let table = v55_accounts(
        jinja_rewrites(SubstitutionTable::new()),
        &request.accounts.provider,
        &request.accounts.consumer,
        abbreviation,
    );
    Ok((ScriptPlan::new(DEPLOY_V55_JINJA), table))
}

fn deploy_v55_sql_param(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let table = v55_accounts(
        SubstitutionTable::new(),
        &request.accounts.provider,
        &request.accounts.consumer,
        abbreviation,
    );
    Ok((ScriptPlan::new(DEPLOY_V55_SQL_PARAM), table))
}

fn add_consumer_v6(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let provider = request.accounts.provider.as_str();
    let consumer = request.accounts.consumer.as_str();
    let abbreviation = token(or_default(&request.abbreviation, V6_ABBREVIATION));

    // SNOWCAT4 marks the consumer being added next to an existing one.
    let table = SubstitutionTable::new()
        .with("SNOWCAT4", consumer)
        .with("snowcat4", consumer)
        .with("SNOWCAT2", provider)
        .with("snowcat2", provider)
        .with("SNOWCAT", consumer)
        .with("snowcat", consumer)
        .with("_DEMO_", abbreviation.as_str())
        .with("_demo_", abbreviation);
    Ok((ScriptPlan::new(ADD_CONSUMER_V6), table))
}

fn add_consumer_v55_jinja(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let table = v55_accounts(
        jinja_rewrites(SubstitutionTable::new()),
        &request.accounts.provider,
        &request.accounts.consumer,
        abbreviation,
    );
    Ok((ScriptPlan::new(ADD_CONSUMER_V55_JINJA), table))
}

fn add_consumer_v55_sql_param(
    request: &PlanRequest,
) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let table = v55_accounts(
        SubstitutionTable::new(),
        &request.accounts.provider,
        &request.accounts.consumer,
        abbreviation,
    );
    Ok((ScriptPlan::new(ADD_CONSUMER_V55_SQL_PARAM), table))
}

fn add_provider_v6(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let provider = request.accounts.provider.as_str();
    let consumer = request.accounts.consumer.as_str();
    let abbreviation = token(or_default(&request.abbreviation, V6_ABBREVIATION));
    let app_name = format!("dcr_demo_app_{}", or_default(&request.app_suffix, APP_SUFFIX));

    let table = SubstitutionTable::new()
        .with("dcr_demo_app_two", app_name.as_str())
        .with("DCR_DEMO_APP_TWO", app_name)
        .with("SNOWCAT3", provider)
        .with("snowcat3", provider)
        .with("SNOWCAT2", provider)
        .with("snowcat2", provider)
        .with("SNOWCAT", consumer)
        .with("snowcat", consumer)
        .with("_DEMO_", abbreviation.as_str())
        .with("_demo_", abbreviation);
    Ok((ScriptPlan::new(ADD_PROVIDER_V6), table))
}

fn add_provider_v55(request: &PlanRequest, jinja: bool) -> SubstitutionTable {
    let provider = request.accounts.provider.as_str();
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let app_name = format!("dcr_samp_app_{}", or_default(&request.app_suffix, APP_SUFFIX));

    let mut table = SubstitutionTable::new()
        .with("dcr_samp_app_two", app_name.as_str())
        .with("DCR_SAMP_APP_TWO", app_name);
    if jinja {
        table = jinja_rewrites(table);
    }
    let table = table
        .with("PROVIDER2_ACCT", provider)
        .with("provider2_acct", provider);
    v55_accounts(table, provider, &request.accounts.consumer, abbreviation)
}

fn add_provider_v55_jinja(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    Ok((
        ScriptPlan::new(ADD_PROVIDER_V55_JINJA),
        add_provider_v55(request, true),
    ))
}

fn add_provider_v55_sql_param(
    request: &PlanRequest,
) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    Ok((
        ScriptPlan::new(ADD_PROVIDER_V55_SQL_PARAM),
        add_provider_v55(request, false),
    ))
}

fn upgrade_v6(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let provider = request.accounts.provider.as_str();
    let consumer = request.accounts.consumer.as_str();
    let new_abbreviation = token(or_default(&request.abbreviation, V6_ABBREVIATION));
    let old_abbreviation = token(or_default(&request.old_abbreviation, V55_ABBREVIATION));

    let table = SubstitutionTable::new()
        .with("SNOWCAT2", provider)
        .with("snowcat2", provider)
        .with("SNOWCAT", consumer)
        .with("snowcat", consumer)
        .with("_DEMO_", new_abbreviation.as_str())
        .with("_demo_", new_abbreviation)
        .with("_SAMP_", old_abbreviation.as_str())
        .with("_samp_", old_abbreviation);
    Ok((ScriptPlan::new(UPGRADE_V6), table))
}

fn uninstall_steps(account_type: AccountType) -> ScriptPlan {
    match account_type {
        AccountType::Provider => ScriptPlan::new(UNINSTALL_PROVIDER),
        AccountType::Consumer => ScriptPlan::new(UNINSTALL_CONSUMER),
    }
}

fn uninstall_v6(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let target = request
        .accounts
        .under_operation
        .as_ref()
        .ok_or(PlanError::MissingUninstallTarget)?;
    let account = target.account.as_str();
    let consumer = request.accounts.consumer.as_str();
    let abbreviation = token(or_default(&request.abbreviation, V6_ABBREVIATION));

    let mut table = SubstitutionTable::new()
        .with("SNOWCAT2", account)
        .with("snowcat2", account)
        .with("SNOWCAT", consumer)
        .with("snowcat", consumer)
        .with("_DEMO_", abbreviation.as_str())
        .with("_demo_", abbreviation);

    // A consumer with several providers has one app per provider.
    if target.account_type == AccountType::Consumer && !request.app_suffix.is_empty() {
        let app_name = format!("_app_{}", request.app_suffix);
        table.push("_app", app_name.as_str());
        table.push("_APP", app_name);
    }

    Ok((uninstall_steps(target.account_type), table))
}

fn uninstall_v55(request: &PlanRequest) -> Result<(ScriptPlan, SubstitutionTable), PlanError> {
    let target = request
        .accounts
        .under_operation
        .as_ref()
        .ok_or(PlanError::MissingUninstallTarget)?;
    let abbreviation = or_default(&request.abbreviation, V55_ABBREVIATION);
    let table = v55_accounts(
        SubstitutionTable::new(),
        &target.account,
        &request.accounts.consumer,
        abbreviation,
    );
    Ok((uninstall_steps(target.account_type), table))
}
