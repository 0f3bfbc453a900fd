//! Built-in Pod model
//!
//! The only concrete resource shipped with the crate. It backs the
//! exec/attach/log/port-forward services and doubles as the reference
//! for declaring schemas on application-defined types.

use serde::{Deserialize, Serialize};

use crate::meta::{
    KindDecl, OperationDecl, PropertyDecl, PropertyKindDecl, ResourceSchema, ResponseDecl,
};
use crate::resource::Resource;

use super::ObjectMeta;

pub static POD_SCHEMA: ResourceSchema = ResourceSchema {
    type_id: "core.v1.Pod",
    parent: None,
    kind: Some(KindDecl {
        kind: "Pod",
        version: "v1",
        group: None,
    }),
    operations: &[
        OperationDecl {
            action: "post",
            path: "/api/v1/namespaces/{namespace}/pods",
            body: Some("Pod"),
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "get",
            path: "/api/v1/namespaces/{namespace}/pods/{name}",
            body: None,
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "put",
            path: "/api/v1/namespaces/{namespace}/pods/{name}",
            body: Some("Pod"),
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "patch",
            path: "/api/v1/namespaces/{namespace}/pods/{name}",
            body: Some("Patch"),
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "delete",
            path: "/api/v1/namespaces/{namespace}/pods/{name}",
            body: None,
            response: ResponseDecl::Named("Status"),
        },
        OperationDecl {
            action: "deletecollection",
            path: "/api/v1/namespaces/{namespace}/pods",
            body: None,
            response: ResponseDecl::Named("Status"),
        },
        OperationDecl {
            action: "list",
            path: "/api/v1/namespaces/{namespace}/pods",
            body: None,
            response: ResponseDecl::Named("PodList"),
        },
        OperationDecl {
            action: "list-all",
            path: "/api/v1/pods",
            body: None,
            response: ResponseDecl::Named("PodList"),
        },
        OperationDecl {
            action: "watch",
            path: "/api/v1/watch/namespaces/{namespace}/pods",
            body: None,
            response: ResponseDecl::Named("WatchEvent"),
        },
        OperationDecl {
            action: "watch-all",
            path: "/api/v1/watch/pods",
            body: None,
            response: ResponseDecl::Named("WatchEvent"),
        },
        OperationDecl {
            action: "get-status",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/status",
            body: None,
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "put-status",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/status",
            body: Some("Pod"),
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "patch-status",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/status",
            body: Some("Patch"),
            response: ResponseDecl::SelfModel,
        },
        OperationDecl {
            action: "proxy",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/proxy/{path}",
            body: None,
            response: ResponseDecl::None,
        },
        OperationDecl {
            action: "get-log",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/log",
            body: None,
            response: ResponseDecl::None,
        },
        OperationDecl {
            action: "connect-exec",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/exec",
            body: None,
            response: ResponseDecl::None,
        },
        OperationDecl {
            action: "connect-attach",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/attach",
            body: None,
            response: ResponseDecl::None,
        },
        OperationDecl {
            action: "connect-portforward",
            path: "/api/v1/namespaces/{namespace}/pods/{name}/portforward",
            body: None,
            response: ResponseDecl::None,
        },
    ],
    properties: &[
        PropertyDecl {
            name: "api_version",
            attribute: "apiVersion",
            kind: PropertyKindDecl::Scalar,
        },
        PropertyDecl {
            name: "kind",
            attribute: "kind",
            kind: PropertyKindDecl::Scalar,
        },
        PropertyDecl {
            name: "metadata",
            attribute: "metadata",
            kind: PropertyKindDecl::Model("ObjectMeta"),
        },
        PropertyDecl {
            name: "spec",
            attribute: "spec",
            kind: PropertyKindDecl::Model("PodSpec"),
        },
        PropertyDecl {
            name: "status",
            attribute: "status",
            kind: PropertyKindDecl::Model("PodStatus"),
        },
    ],
};

pub static POD_LIST_SCHEMA: ResourceSchema = ResourceSchema {
    type_id: "core.v1.PodList",
    parent: None,
    kind: None,
    operations: &[],
    properties: &[
        PropertyDecl {
            name: "metadata",
            attribute: "metadata",
            kind: PropertyKindDecl::Model("ListMeta"),
        },
        PropertyDecl {
            name: "items",
            attribute: "items",
            kind: PropertyKindDecl::Collection("Pod"),
        },
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<PodSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PodStatus>,
}

impl Pod {
    /// A pod stub addressing `name` in `namespace`, enough for the
    /// instance-scoped verbs and the streaming services.
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Pod {
            metadata: Some(ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl Resource for Pod {
    type List = PodList;

    fn schema() -> &'static ResourceSchema {
        &POD_SCHEMA
    }

    fn metadata(&self) -> Option<&ObjectMeta> {
        self.metadata.as_ref()
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        self.metadata.get_or_insert_with(Default::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ListMeta>,
    #[serde(default)]
    pub items: Vec<Pod>,
}

/// Metadata carried by list envelopes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
}
